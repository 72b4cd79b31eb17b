/// Configuration management for the API server
///
/// Configuration is loaded from environment variables (with a `.env` file in
/// development via dotenvy).
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `GOOGLE_CLIENT_ID`: OAuth client id (required)
/// - `GOOGLE_CLIENT_SECRET`: OAuth client secret (required)
/// - `GOOGLE_REDIRECT_URI`: OAuth callback URL registered with Google (required)
/// - `GOOGLE_AUTH_URL` / `GOOGLE_TOKEN_URL` / `GOOGLE_USERINFO_URL`:
///   provider endpoints, overridable for tests
/// - `FRONTEND_URL`: Base URL of the web client (default: http://localhost:3000)
/// - `RUST_LOG`: Log level (default: info)

use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Google OAuth configuration for the connect-calendar flow
    pub google: GoogleConfig,

    /// Frontend configuration
    pub frontend: FrontendConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins ("*" means permissive, development only)
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Google OAuth configuration
///
/// The endpoint URLs default to Google's production endpoints; tests point
/// them at a local stub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    ///
    /// Never logged; `Config` must not be Debug-printed at info level.
    pub client_secret: String,

    /// Callback URL registered with the provider
    pub redirect_uri: String,

    /// Authorization (consent screen) endpoint
    pub auth_url: String,

    /// Code-for-token exchange endpoint
    pub token_url: String,

    /// Userinfo endpoint used to identify the connected account
    pub userinfo_url: String,
}

/// Frontend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Base URL of the web client, target of OAuth callback redirects
    pub base_url: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a numeric
    /// variable fails to parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let client_id = env::var("GOOGLE_CLIENT_ID")
            .map_err(|_| anyhow::anyhow!("GOOGLE_CLIENT_ID environment variable is required"))?;
        let client_secret = env::var("GOOGLE_CLIENT_SECRET").map_err(|_| {
            anyhow::anyhow!("GOOGLE_CLIENT_SECRET environment variable is required")
        })?;
        let redirect_uri = env::var("GOOGLE_REDIRECT_URI").map_err(|_| {
            anyhow::anyhow!("GOOGLE_REDIRECT_URI environment variable is required")
        })?;

        let auth_url = env::var("GOOGLE_AUTH_URL")
            .unwrap_or_else(|_| "https://accounts.google.com/o/oauth2/v2/auth".to_string());
        let token_url = env::var("GOOGLE_TOKEN_URL")
            .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string());
        let userinfo_url = env::var("GOOGLE_USERINFO_URL")
            .unwrap_or_else(|_| "https://www.googleapis.com/oauth2/v2/userinfo".to_string());

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            google: GoogleConfig {
                client_id,
                client_secret,
                redirect_uri,
                auth_url,
                token_url,
                userinfo_url,
            },
            frontend: FrontendConfig {
                base_url: frontend_url,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// URL of the frontend connect-calendar page
    ///
    /// Target of OAuth callback redirects, with or without an `error` query
    /// parameter.
    pub fn connect_calendar_url(&self) -> String {
        format!(
            "{}/register/connect-calendar",
            self.frontend.base_url.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/ignitecall_test".to_string(),
                max_connections: 10,
            },
            google: GoogleConfig {
                client_id: "client-id".to_string(),
                client_secret: "client-secret".to_string(),
                redirect_uri: "http://localhost:8080/api/integrations/calendar/callback"
                    .to_string(),
                auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
                token_url: "https://oauth2.googleapis.com/token".to_string(),
                userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
            },
            frontend: FrontendConfig {
                base_url: "http://localhost:3000/".to_string(),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(sample_config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_connect_calendar_url_strips_trailing_slash() {
        assert_eq!(
            sample_config().connect_calendar_url(),
            "http://localhost:3000/register/connect-calendar"
        );
    }
}
