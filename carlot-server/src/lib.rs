//! carlot-server: HTTP API over a soft-deletable `car` table
//!
//! Each request checks out one pooled MySQL connection, applies the session
//! settings (strict sql_mode, fixed time zone), runs its statements and
//! returns the connection when the handler finishes.

pub mod config;
pub mod db;
pub mod http;
pub mod models;

pub use config::{ConfigError, SessionSettings, StoreConfig};
pub use http::{build_router, run_server, ApiError, AppState, CorsPolicy, ServerConfig, ServerError};
