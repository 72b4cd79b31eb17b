/// Database models for Ignite Call
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Registered accounts with unique usernames
/// - `session`: Server-side sessions backing the session cookie
/// - `calendar_connection`: OAuth calendar grants (one per user)

pub mod calendar_connection;
pub mod session;
pub mod user;
