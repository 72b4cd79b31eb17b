//! # Ignite Call Shared Library
//!
//! This crate contains the database layer and types shared by the Ignite Call
//! API server: models, the connection pool, the migration runner, and session
//! token utilities.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD operations
//! - `db`: Connection pool and migrations
//! - `auth`: Opaque session token generation and hashing

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Ignite Call shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
