/// Calendar connection model
///
/// Records the outcome of the connect-calendar OAuth flow. A user has at most
/// one connection (`calendar_connections_user_id_key`); reconnecting replaces
/// the stored grant. Token refresh is out of scope, so only the access token
/// granted at connect time is kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// An OAuth calendar grant for a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CalendarConnection {
    /// Unique connection ID
    pub id: Uuid,

    /// Owning user (unique, one connection per user)
    pub user_id: Uuid,

    /// Provider identifier, currently always "google"
    pub provider: String,

    /// Account ID reported by the provider's userinfo endpoint
    pub provider_account_id: String,

    /// Access token granted at connect time
    ///
    /// Never serialized into API responses.
    #[serde(skip_serializing)]
    pub access_token: String,

    /// When the calendar was connected
    pub created_at: DateTime<Utc>,
}

/// Input for recording a calendar connection
#[derive(Debug, Clone)]
pub struct CreateCalendarConnection {
    pub user_id: Uuid,
    pub provider: String,
    pub provider_account_id: String,
    pub access_token: String,
}

impl CalendarConnection {
    /// Creates or replaces the connection for a user
    ///
    /// Uses the unique index on `user_id` so that reconnecting overwrites the
    /// previous grant instead of accumulating rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn upsert(
        pool: &PgPool,
        data: CreateCalendarConnection,
    ) -> Result<Self, sqlx::Error> {
        let connection = sqlx::query_as::<_, CalendarConnection>(
            r#"
            INSERT INTO calendar_connections (user_id, provider, provider_account_id, access_token)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET provider = EXCLUDED.provider,
                provider_account_id = EXCLUDED.provider_account_id,
                access_token = EXCLUDED.access_token
            RETURNING id, user_id, provider, provider_account_id, access_token, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.provider)
        .bind(data.provider_account_id)
        .bind(data.access_token)
        .fetch_one(pool)
        .await?;

        Ok(connection)
    }

    /// Finds the connection for a user, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let connection = sqlx::query_as::<_, CalendarConnection>(
            r#"
            SELECT id, user_id, provider, provider_account_id, access_token, created_at
            FROM calendar_connections
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_not_serialized() {
        let connection = CalendarConnection {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            provider: "google".to_string(),
            provider_account_id: "117".to_string(),
            access_token: "ya29.secret".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&connection).unwrap();
        assert!(json.get("access_token").is_none());
        assert_eq!(json["provider"], "google");
    }
}
