//! Database layer - connection pool, request-scoped connections, repositories
//!
//! # Design Principles
//!
//! - One pooled connection per request, released on drop
//! - Session settings applied at every checkout, not only at connect
//! - Parameters are always bound, never formatted into SQL
//! - Transactions for multi-step operations

pub mod pool;
pub mod repos;
pub mod session;

pub use pool::{create_lazy_pool, create_pool};
pub use repos::*;
pub use session::{PoolUsage, ScopedConnection, UsageGuard};
