/// Authentication utilities
///
/// - `session_token`: Opaque session token generation and hashing

pub mod session_token;
