//! Configuration module for the SCode service.
//!
//! All configuration is loaded from environment variables (and an optional `.env`
//! file) with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration errors surfaced at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Coordinates of the GitHub repository holding the JSON files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub branch: Option<String>,
    pub api_url: String,
}

/// Which blob store backs the collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    GitHub(GitHubConfig),
    /// Local directory with the same file layout, used when no GitHub token is configured.
    LocalDir(PathBuf),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Remote store selection
    pub store: StoreBackend,
    /// Pre-shared key accepted by the JSON API in place of a session
    pub api_key: Option<String>,
    /// Lifetime of an admin session
    pub session_ttl: chrono::Duration,
    /// Attempts per write when the remote revision moved underneath us
    pub write_attempts: usize,
    /// Base backoff between conflicting write attempts
    pub retry_backoff_ms: u64,
    /// Timeout applied to every remote store request
    pub http_timeout: Duration,
    /// How long a page waits for its collection before rendering placeholders
    pub mount_wait: Duration,
}

const DEFAULT_GITHUB_API: &str = "https://api.github.com";

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr: SocketAddr =
            parse_or(&var, "SCODE_BIND_ADDR", "127.0.0.1:8080".parse().ok())?;
        let log_level = var("SCODE_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_json: bool = parse_or(&var, "SCODE_LOG_JSON", Some(false))?;

        let github = match (
            var("SCODE_GITHUB_TOKEN"),
            var("SCODE_GITHUB_OWNER"),
            var("SCODE_GITHUB_REPO"),
        ) {
            (Some(token), Some(owner), Some(repo)) => Some(GitHubConfig {
                token,
                owner,
                repo,
                branch: var("SCODE_GITHUB_BRANCH"),
                api_url: var("SCODE_GITHUB_API_URL")
                    .unwrap_or_else(|| DEFAULT_GITHUB_API.to_string())
                    .trim_end_matches('/')
                    .to_string(),
            }),
            _ => None,
        };

        let store = match github {
            Some(github) => StoreBackend::GitHub(github),
            None => StoreBackend::LocalDir(
                var("SCODE_DATA_DIR")
                    .unwrap_or_else(|| "./data".to_string())
                    .into(),
            ),
        };

        let api_key = var("SCODE_API_KEY");

        let ttl_minutes: i64 = parse_or(&var, "SCODE_SESSION_TTL_MINUTES", Some(720))?;
        if ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "SCODE_SESSION_TTL_MINUTES",
                value: ttl_minutes.to_string(),
            });
        }

        let write_attempts: usize = parse_or(&var, "SCODE_WRITE_ATTEMPTS", Some(3))?;
        if write_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "SCODE_WRITE_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        let retry_backoff_ms: u64 = parse_or(&var, "SCODE_RETRY_BACKOFF_MS", Some(150))?;
        let http_timeout_secs: u64 = parse_or(&var, "SCODE_HTTP_TIMEOUT_SECS", Some(30))?;
        let mount_wait_ms: u64 = parse_or(&var, "SCODE_MOUNT_WAIT_MS", Some(1500))?;

        Ok(Self {
            bind_addr,
            log_level,
            log_json,
            store,
            api_key,
            session_ttl: chrono::Duration::minutes(ttl_minutes),
            write_attempts,
            retry_backoff_ms,
            http_timeout: Duration::from_secs(http_timeout_secs),
            mount_wait: Duration::from_millis(mount_wait_ms),
        })
    }
}

fn parse_or<T, F>(var: &F, key: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => default.ok_or(ConfigError::Invalid {
            key,
            value: String::new(),
        }),
    }
}
