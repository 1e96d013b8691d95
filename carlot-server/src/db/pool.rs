//! Database connection pool management
//!
//! Uses sqlx MySqlPool with explicit connection limits.

use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;

use crate::config::StoreConfig;

fn pool_options(config: &StoreConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
}

/// Create a MySQL connection pool, opening one connection up front.
///
/// # Errors
///
/// Returns an error if the database cannot be reached.
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::from_url("mysql://root@localhost/cars")?;
/// let pool = create_pool(&config).await?;
/// ```
pub async fn create_pool(config: &StoreConfig) -> Result<MySqlPool, sqlx::Error> {
    pool_options(config)
        .connect_with(config.connect.clone())
        .await
}

/// Create a pool that connects on first checkout.
///
/// The server starts even while the database is down; requests fail with
/// `store_unavailable` until it comes back.
pub fn create_lazy_pool(config: &StoreConfig) -> MySqlPool {
    pool_options(config).connect_lazy_with(config.connect.clone())
}
