/// API route handlers
///
/// Handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Registration and username availability
/// - `sessions`: Current-user lookup and logout
/// - `calendar`: Connect-calendar OAuth flow

pub mod calendar;
pub mod health;
pub mod sessions;
pub mod users;
