//! SCode
//!
//! A catalog of community scraper snippets and WhatsApp bot listings, persisted
//! as JSON files in a GitHub repository, with a small admin dashboard.

mod api;
mod auth;
mod catalog;
mod config;
mod errors;
mod models;
mod store;
mod views;
mod web;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use auth::SessionStore;
use catalog::CollectionHook;
use config::{Config, StoreBackend};
use models::{BotItem, ScraperItem};
use store::{
    BlobStore, GitHubStore, LocalDirStore, RemoteCollection, RetryPolicy, UserDirectory,
    BOTS_PATH, SCRAPERS_PATH,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub scrapers: Arc<CollectionHook<ScraperItem>>,
    pub bots: Arc<CollectionHook<BotItem>>,
    pub users: Arc<UserDirectory>,
    pub sessions: Arc<SessionStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn BlobStore>, config: Config) -> Self {
        let retry = RetryPolicy {
            max_attempts: config.write_attempts,
            base_backoff_ms: config.retry_backoff_ms,
        };

        Self {
            scrapers: Arc::new(CollectionHook::new(RemoteCollection::new(
                store.clone(),
                SCRAPERS_PATH,
                "Update scrapers data",
                retry.clone(),
            ))),
            bots: Arc::new(CollectionHook::new(RemoteCollection::new(
                store.clone(),
                BOTS_PATH,
                "Update WA bots data",
                retry,
            ))),
            users: Arc::new(UserDirectory::new(store)),
            sessions: Arc::new(SessionStore::new(config.session_ttl)),
            config: Arc::new(config),
        }
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn BlobStore>, store::StoreError> {
    let store: Arc<dyn BlobStore> = match &config.store {
        StoreBackend::GitHub(github) => {
            tracing::info!(
                owner = %github.owner,
                repo = %github.repo,
                branch = ?github.branch,
                "Using GitHub repository store"
            );
            Arc::new(GitHubStore::new(github.clone(), config.http_timeout)?)
        }
        StoreBackend::LocalDir(dir) => {
            tracing::warn!(
                "No GitHub token configured (SCODE_GITHUB_TOKEN). Data is kept in {:?}",
                dir
            );
            Arc::new(LocalDirStore::new(dir.clone()))
        }
    };
    tracing::info!(backend = store.backend_tag(), "Store ready");
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting SCode");
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.api_key.is_none() {
        tracing::info!("No API key configured (SCODE_API_KEY); API writes need a session");
    }

    let store = open_store(&config)?;
    let bind_addr = config.bind_addr;
    let state = AppState::new(store, config);

    // Warm both collections so the first page view has data
    let scrapers = state.scrapers.clone();
    tokio::spawn(async move { scrapers.load().await });
    let bots = state.bots.clone();
    tokio::spawn(async move { bots.load().await });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public reads
    let api_public = Router::new()
        .route("/scrapers", get(api::list_scrapers))
        .route("/bots", get(api::list_bots));

    // Writes need a session or the API key
    let api_admin = Router::new()
        .route(
            "/scrapers",
            post(api::create_scraper).put(api::replace_scrapers),
        )
        .route(
            "/scrapers/{id}",
            put(api::update_scraper).delete(api::delete_scraper),
        )
        .route("/bots", post(api::create_bot).put(api::replace_bots))
        .route("/bots/{id}", put(api::update_bot).delete(api::delete_bot))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    let api_routes = api_public.merge(api_admin).layer(cors);

    let pages = Router::new()
        .route("/", get(web::home))
        .route("/login", get(web::login_form).post(web::login))
        .route("/logout", post(web::logout))
        .route("/assets/app.css", get(web::stylesheet))
        .route("/assets/app.js", get(web::script));

    let dashboard = Router::new()
        .route("/dashboard", get(web::dashboard))
        .route("/dashboard/scrapers", post(web::add_scraper))
        .route("/dashboard/bots", post(web::add_bot))
        .route(
            "/dashboard/scrapers/{id}/delete",
            post(web::delete_scraper_entry),
        )
        .route("/dashboard/bots/{id}/delete", post(web::delete_bot_entry))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(pages)
        .merge(dashboard)
        .merge(health_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
