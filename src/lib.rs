//! Octogate - GitHub login in front of a small dashboard
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Route Layer (Axum)                      │
//! │  - Landing page and dashboard                               │
//! │  - OAuth login / callback / logout                          │
//! │  - Static assets, health, metrics                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Auth Layer                            │
//! │  - OAuth client (GitHub)                                    │
//! │  - Session store (in-memory)                                │
//! │  - Cookie guard                                             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - SQLite (sqlx), single `user` table                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTML pages and the metrics endpoint
//! - `auth`: GitHub OAuth authentication and sessions
//! - `data`: Database layer
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments
//! - `response`: Redirect helpers

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod response;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request and contains
/// shared resources like the database pool and session store.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// Session id -> user id
    pub sessions: Arc<dyn auth::SessionStore>,

    /// Registered OAuth apps
    pub oauth: Arc<auth::OAuthProviders>,
}

impl AppState {
    /// Initialize application state with an in-memory session store
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        Self::with_session_store(config, Arc::new(auth::MemorySessionStore::new())).await
    }

    /// Initialize application state around an existing session store
    ///
    /// # Steps
    /// 1. Connect to SQLite database (runs migrations)
    /// 2. Initialize HTTP client
    /// 3. Register OAuth providers
    pub async fn with_session_store(
        config: config::AppConfig,
        sessions: Arc<dyn auth::SessionStore>,
    ) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        // 1. Connect to database
        let db = data::Database::connect(&config.database.url).await?;
        tracing::info!("Database connected");

        // 2. Initialize HTTP client
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("Octogate/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| error::AppError::Internal(e.into()))?;

        // 3. Register OAuth providers
        let oauth = auth::OAuthProviders::from_config(&config, http_client);
        match oauth.client(auth::Provider::GitHub) {
            Ok(client) => tracing::info!(
                redirect_uri = client.redirect_uri(),
                "GitHub OAuth registered"
            ),
            Err(_) => tracing::warn!("GitHub OAuth not configured in environment"),
        }

        tracing::info!("Application state initialized successfully");

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
            sessions,
            oauth: Arc::new(oauth),
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{services::ServeDir, trace::TraceLayer};

    let static_files = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(api::home_router())
        .merge(api::app_router())
        .merge(auth::auth_router())
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(api::metrics_router())
}

async fn health_check() -> &'static str {
    "OK"
}
