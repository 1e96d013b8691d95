//! Command implementations for the carlot CLI

pub mod serve;

pub use serve::run_serve;
