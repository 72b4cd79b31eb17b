/// Session model and database operations
///
/// A session row backs the `@ignitecall:userId` cookie. The cookie carries an
/// opaque random token; only the SHA-256 hex of that token is stored here, so
/// a database leak does not leak usable sessions. Sessions expire after seven
/// days, matching the cookie's Max-Age.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token_hash VARCHAR(64) NOT NULL,
///     oauth_state_hash VARCHAR(64),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ NOT NULL
/// );
/// CREATE UNIQUE INDEX sessions_token_hash_key ON sessions (token_hash);
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A server-side session
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// Unique session ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// SHA-256 hex of the opaque cookie token
    pub token_hash: String,

    /// SHA-256 hex of the in-flight OAuth state value, if a connect flow
    /// was started from this session and has not completed
    pub oauth_state_hash: Option<String>,

    /// When the session was established
    pub created_at: DateTime<Utc>,

    /// When the session stops being honored
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session for a user
    ///
    /// `ttl_seconds` controls `expires_at` and should match the cookie's
    /// Max-Age so server and client agree on lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        token_hash: &str,
        ttl_seconds: i64,
    ) -> Result<Self, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token_hash, expires_at)
            VALUES ($1, $2, NOW() + make_interval(secs => $3))
            RETURNING id, user_id, token_hash, oauth_state_hash, created_at, expires_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(ttl_seconds as f64)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Looks up a live session by token hash
    ///
    /// Expired sessions are deleted on touch and reported as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn find_valid(pool: &PgPool, token_hash: &str) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, token_hash, oauth_state_hash, created_at, expires_at
            FROM sessions
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        match session {
            Some(s) if s.expires_at <= Utc::now() => {
                Session::delete(pool, s.id).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Stores the hash of a freshly issued OAuth state value
    ///
    /// Called when a connect flow starts; the callback compares against this
    /// hash and clears it, so each state value is honored at most once.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn set_oauth_state(
        pool: &PgPool,
        id: Uuid,
        state_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE sessions SET oauth_state_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(state_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clears the stored OAuth state hash
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn clear_oauth_state(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE sessions SET oauth_state_hash = NULL WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a session by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes all expired sessions
    ///
    /// Housekeeping for sessions whose cookies were simply dropped by the
    /// browser and never touched again. Runs at server startup.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
