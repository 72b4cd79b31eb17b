/// Session token generation and hashing
///
/// The session cookie holds an opaque token rather than a raw user id, so
/// possession of the cookie value is the only credential and the server stays
/// the authority on what it maps to.
///
/// # Security
///
/// - **Format**: `ic_{40_chars}` (prefix + 40 random base62 chars)
/// - **Storage**: only the SHA-256 hex of the token is persisted
/// - **Lifetime**: seven days, mirrored by the cookie's Max-Age
///
/// # Example
///
/// ```
/// use ignitecall_shared::auth::session_token::{generate_session_token, hash_session_token};
///
/// let (token, hash) = generate_session_token();
/// assert!(token.starts_with("ic_"));
/// assert_eq!(hash, hash_session_token(&token));
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "@ignitecall:userId";

/// Session lifetime in seconds (seven days)
pub const SESSION_TTL_SECONDS: i64 = 604_800;

/// Length of the random part of a session token (characters)
const TOKEN_RANDOM_LENGTH: usize = 40;

/// Session token prefix
const TOKEN_PREFIX: &str = "ic_";

/// Total length of a session token (prefix + random)
pub const SESSION_TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Length of an OAuth state value (characters)
const OAUTH_STATE_LENGTH: usize = 32;

/// Generates a new session token
///
/// Returns the plaintext token (for the cookie) and its SHA-256 hex hash
/// (for storage).
pub fn generate_session_token() -> (String, String) {
    let token = format!("{}{}", TOKEN_PREFIX, random_base62(TOKEN_RANDOM_LENGTH));
    let hash = hash_session_token(&token);

    (token, hash)
}

/// Generates a per-flow OAuth state value
///
/// The plaintext goes into the provider URL; only the hash is stored on the
/// session, so the value appearing in browser history and provider logs
/// never doubles as a database lookup key.
pub fn generate_oauth_state() -> (String, String) {
    let state = random_base62(OAUTH_STATE_LENGTH);
    let hash = hash_oauth_state(&state);

    (state, hash)
}

/// Hashes a session token for storage or lookup
///
/// Returns the hex-encoded SHA-256 digest (64 characters).
pub fn hash_session_token(token: &str) -> String {
    sha256_hex(token)
}

/// Hashes an OAuth state value for storage or comparison
pub fn hash_oauth_state(state: &str) -> String {
    sha256_hex(state)
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Validates the shape of a session token before touching the database
///
/// Anything that is not `ic_` plus 40 base62 characters cannot be a token we
/// issued, so lookups for it are skipped.
pub fn validate_session_token_format(token: &str) -> bool {
    if token.len() != SESSION_TOKEN_LENGTH {
        return false;
    }

    let Some(random_part) = token.strip_prefix(TOKEN_PREFIX) else {
        return false;
    };

    random_part.chars().all(|c| c.is_ascii_alphanumeric())
}

fn random_base62(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_session_token() {
        let (token, hash) = generate_session_token();

        assert!(token.starts_with(TOKEN_PREFIX));
        assert_eq!(token.len(), SESSION_TOKEN_LENGTH);
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_session_token(&token));
    }

    #[test]
    fn test_tokens_are_unique() {
        let (a, _) = generate_session_token();
        let (b, _) = generate_session_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_is_deterministic() {
        let hash1 = hash_session_token("ic_test");
        let hash2 = hash_session_token("ic_test");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_validate_format() {
        let (token, _) = generate_session_token();
        assert!(validate_session_token_format(&token));

        assert!(!validate_session_token_format("ic_short"));
        assert!(!validate_session_token_format(&format!(
            "xx_{}",
            "a".repeat(TOKEN_RANDOM_LENGTH)
        )));
        assert!(!validate_session_token_format(&format!(
            "ic_{}!",
            "a".repeat(TOKEN_RANDOM_LENGTH - 1)
        )));
        // A bare user id, the pre-redesign cookie value, is not a token.
        assert!(!validate_session_token_format(
            "4f9d3a1e-8c1b-4f6a-9e2d-1c3b5a7d9e0f"
        ));
    }

    #[test]
    fn test_session_ttl_matches_cookie_max_age() {
        assert_eq!(SESSION_TTL_SECONDS, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_oauth_state_is_not_the_token_hash() {
        let (state, state_hash) = generate_oauth_state();

        assert_eq!(state.len(), OAUTH_STATE_LENGTH);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(state_hash, hash_oauth_state(&state));

        // The state sent to the provider must never be a stored lookup key.
        let (token, token_hash) = generate_session_token();
        assert_ne!(state, token_hash);
        assert_ne!(state_hash, hash_session_token(&token));
    }
}
