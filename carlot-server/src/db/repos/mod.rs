//! Repository implementations for database access
//!
//! Repositories borrow a request-scoped connection rather than the pool, so
//! everything a request does runs on the connection it checked out.

pub mod cars;

pub use cars::{Car, CarRepo, DbError};
