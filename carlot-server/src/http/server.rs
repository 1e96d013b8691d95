//! Axum server setup
//!
//! Server skeleton with:
//! - CORS (open by default, credentials allowed)
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use sqlx::MySqlPool;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::config::SessionSettings;
use crate::db::{DbError, PoolUsage, ScopedConnection};

/// Cross-origin policy
#[derive(Debug, Clone, Default)]
pub enum CorsPolicy {
    /// Any origin, credentials allowed (the request origin is mirrored back)
    #[default]
    Permissive,

    /// Only the listed origins, credentials allowed
    Origins(Vec<HeaderValue>),
}

impl CorsPolicy {
    /// Build from a list of origins; an empty list means permissive.
    pub fn from_origins<I, S>(origins: I) -> Result<Self, ServerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let origins = origins
            .into_iter()
            .map(|o| o.as_ref().trim().to_owned())
            .filter(|o| !o.is_empty())
            .map(|o| HeaderValue::from_str(&o).map_err(|_| ServerError::InvalidOrigin(o)))
            .collect::<Result<Vec<_>, _>>()?;

        if origins.is_empty() {
            Ok(Self::Permissive)
        } else {
            Ok(Self::Origins(origins))
        }
    }

    fn layer(&self) -> CorsLayer {
        match self {
            Self::Permissive => CorsLayer::very_permissive(),
            Self::Origins(origins) => CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins.clone()))
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_credentials(true),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3000)
    pub bind_addr: SocketAddr,

    /// Cross-origin policy (default: permissive)
    pub cors: CorsPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cors: CorsPolicy::default(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pool: MySqlPool,
    session: SessionSettings,
    usage: Arc<PoolUsage>,
}

impl AppState {
    pub fn new(pool: MySqlPool, session: SessionSettings) -> Self {
        Self {
            pool,
            session,
            usage: PoolUsage::new(),
        }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub fn usage(&self) -> &PoolUsage {
        &self.usage
    }

    /// Check out a session-configured connection for one request.
    pub async fn checkout(&self) -> Result<ScopedConnection, DbError> {
        ScopedConnection::checkout(&self.pool, &self.session, &self.usage).await
    }
}

/// Build the application router with all routes
pub fn build_router(state: Arc<AppState>, cors: &CorsPolicy) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::cars::router())
        .layer(cors.layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&store).await?;
/// run_server(pool, store.session, ServerConfig::default()).await?;
/// ```
pub async fn run_server(
    pool: MySqlPool,
    session: SessionSettings,
    config: ServerConfig,
) -> Result<(), ServerError> {
    tracing::info!(
        sql_mode = session.sql_mode(),
        time_zone = session.time_zone(),
        "session settings loaded"
    );

    if matches!(config.cors, CorsPolicy::Permissive) {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed with credentials");
    }

    let state = Arc::new(AppState::new(pool.clone(), session));
    let app = build_router(state, &config.cors);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid CORS origin: {0}")]
    InvalidOrigin(String),
}
