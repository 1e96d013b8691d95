//! Request-scoped connections
//!
//! A `ScopedConnection` is checked out for exactly one request. It applies the
//! configured session settings on checkout and goes back to the pool when it
//! is dropped, on the success path and the error path alike.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use sqlx::pool::PoolConnection;
use sqlx::{Executor, MySql, MySqlConnection, MySqlPool};

use super::DbError;
use crate::config::SessionSettings;

/// Checkout/release counters for pooled connections taken by requests.
#[derive(Debug, Default)]
pub struct PoolUsage {
    checkouts: AtomicU64,
    releases: AtomicU64,
}

/// Point-in-time copy of [`PoolUsage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageSnapshot {
    pub checkouts: u64,
    pub releases: u64,
    pub in_flight: u64,
}

impl PoolUsage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record a checkout; the release is recorded when the guard drops.
    pub fn begin(self: &Arc<Self>) -> UsageGuard {
        self.checkouts.fetch_add(1, Ordering::AcqRel);
        UsageGuard {
            usage: Arc::clone(self),
        }
    }

    pub fn checkouts(&self) -> u64 {
        self.checkouts.load(Ordering::Acquire)
    }

    pub fn releases(&self) -> u64 {
        self.releases.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        // Releases first so in_flight never underflows under concurrent drops
        let releases = self.releases();
        let checkouts = self.checkouts();
        UsageSnapshot {
            checkouts,
            releases,
            in_flight: checkouts.saturating_sub(releases),
        }
    }
}

/// Marks one outstanding checkout until dropped
#[derive(Debug)]
pub struct UsageGuard {
    usage: Arc<PoolUsage>,
}

impl Drop for UsageGuard {
    fn drop(&mut self) {
        self.usage.releases.fetch_add(1, Ordering::AcqRel);
    }
}

/// A pooled connection owned by a single request.
pub struct ScopedConnection {
    // Drop order: the connection first, then the release counter.
    conn: PoolConnection<MySql>,
    _usage: UsageGuard,
}

impl ScopedConnection {
    /// Check out a connection and apply the session settings to it.
    ///
    /// Waits for a free pool slot up to the pool's acquire timeout. If a
    /// session statement fails, the connection is released before the error
    /// is returned.
    pub async fn checkout(
        pool: &MySqlPool,
        session: &SessionSettings,
        usage: &Arc<PoolUsage>,
    ) -> Result<Self, DbError> {
        let mut conn = pool.acquire().await?;
        let guard = usage.begin();

        // Text protocol, no prepare; SET cannot take bound parameters
        for statement in session.statements() {
            conn.execute(statement.as_str()).await?;
        }

        tracing::trace!(
            sql_mode = session.sql_mode(),
            time_zone = session.time_zone(),
            "connection checked out"
        );

        Ok(Self {
            conn,
            _usage: guard,
        })
    }
}

impl Deref for ScopedConnection {
    type Target = MySqlConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for ScopedConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_counts_release_on_drop() {
        let usage = PoolUsage::new();

        let first = usage.begin();
        let second = usage.begin();
        assert_eq!(
            usage.snapshot(),
            UsageSnapshot {
                checkouts: 2,
                releases: 0,
                in_flight: 2
            }
        );

        drop(first);
        assert_eq!(usage.snapshot().in_flight, 1);

        drop(second);
        assert_eq!(usage.checkouts(), usage.releases());
        assert_eq!(usage.snapshot().in_flight, 0);
    }

    #[test]
    fn guard_released_during_unwind() {
        let usage = PoolUsage::new();
        let cloned = Arc::clone(&usage);

        let result = std::panic::catch_unwind(move || {
            let _guard = cloned.begin();
            panic!("handler blew up");
        });

        assert!(result.is_err());
        assert_eq!(usage.checkouts(), 1);
        assert_eq!(usage.releases(), 1);
    }

    #[tokio::test]
    async fn failed_checkout_counts_nothing() {
        let config = crate::config::StoreConfig::from_parts("127.0.0.1", 1, "carlot", "", "carlot")
            .with_acquire_timeout(std::time::Duration::from_millis(250));
        let pool = crate::db::create_lazy_pool(&config);
        let usage = PoolUsage::new();

        let result = ScopedConnection::checkout(&pool, &config.session, &usage).await;

        assert!(matches!(result, Err(DbError::Sqlx(_))));
        assert_eq!(usage.checkouts(), 0);
        assert_eq!(usage.releases(), 0);
    }
}
