//! Admin sessions.
//!
//! A successful login creates a server-side session with a fixed lifetime; the
//! browser only holds its opaque token in an `HttpOnly` cookie.

use std::collections::HashMap;

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "scode_session";

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

pub struct SessionStore {
    ttl: chrono::Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl: chrono::Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn create(&self, username: &str) -> Session {
        let now = Utc::now();
        let session = Session {
            token: uuid::Uuid::new_v4().simple().to_string(),
            username: username.to_string(),
            created_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| !s.is_expired_at(now));
        sessions.insert(session.token.clone(), session.clone());
        session
    }

    /// Look up a live session. Expired sessions are dropped.
    pub async fn validate(&self, token: &str) -> Option<Session> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(s) if !s.is_expired_at(now) => return Some(s.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        tracing::info!("Session expired");
        self.sessions.write().await.remove(token);
        None
    }

    /// Drop a session, returning it when it existed.
    pub async fn revoke(&self, token: &str) -> Option<Session> {
        self.sessions.write().await.remove(token)
    }

    /// `Set-Cookie` value for a new session.
    pub fn cookie_for(&self, session: &Session) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE,
            session.token,
            self.ttl.num_seconds()
        )
    }
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        SESSION_COOKIE
    )
}

/// Extract the session token from the request cookies.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
