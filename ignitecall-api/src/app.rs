/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware.
///
/// # Example
///
/// ```no_run
/// use ignitecall_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = ignitecall_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, routes};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use ignitecall_shared::{
    auth::session_token::{hash_session_token, validate_session_token_format, SESSION_COOKIE},
    models::{session::Session, user::User},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// HTTP client for OAuth provider calls
    pub http: reqwest::Client,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}

/// The authenticated user attached to request extensions
///
/// Inserted by `session_auth_layer` after the session cookie resolves to a
/// live session. Handlers extract it with Axum's `Extension` extractor.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The user owning the session
    pub user: User,

    /// The resolved session row
    pub session: Session,
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                                  # Health check (public)
/// └── /api/
///     ├── POST   /users                        # Register (sets session cookie)
///     ├── GET    /users/:username/availability # Username availability
///     ├── GET    /sessions/me                  # Current user (session)
///     ├── DELETE /sessions                     # Logout (session)
///     └── /integrations/calendar/
///         ├── GET  /                           # Connection state (session)
///         ├── POST /connect                    # Authorize URL (session)
///         └── GET  /callback                   # OAuth redirect target
/// ```
///
/// Routes registering only POST answer other verbs with 405 and an empty
/// body via Axum's method routing, which is the registration endpoint's
/// method-not-allowed contract.
pub fn build_router(state: AppState) -> Router {
    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public API routes. The OAuth callback resolves the session itself so
    // that provider errors can still be redirected without one.
    let public_routes = Router::new()
        .route("/users", post(routes::users::register))
        .route(
            "/users/:username/availability",
            get(routes::users::availability),
        )
        .route(
            "/integrations/calendar/callback",
            get(routes::calendar::callback),
        );

    // Session-authenticated routes
    let session_routes = Router::new()
        .route("/sessions/me", get(routes::sessions::me))
        .route("/sessions", delete(routes::sessions::logout))
        .route("/integrations/calendar", get(routes::calendar::status))
        .route(
            "/integrations/calendar/connect",
            post(routes::calendar::connect),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    let api_routes = public_routes.merge(session_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Session authentication middleware layer
///
/// Resolves the session cookie to a user and injects `CurrentUser` into
/// request extensions; rejects with 401 otherwise.
async fn session_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = CookieJar::from_headers(req.headers());

    let current = resolve_session(&state.db, &jar)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Missing or invalid session".to_string()))?;

    req.extensions_mut().insert(current);

    Ok(next.run(req).await)
}

/// Resolves the session cookie to the current user
///
/// Returns `Ok(None)` when the cookie is absent, malformed, expired, or does
/// not match a live session. Database errors still propagate.
pub async fn resolve_session(
    pool: &PgPool,
    jar: &CookieJar,
) -> Result<Option<CurrentUser>, ApiError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    // Skip the lookup for values we could never have issued.
    if !validate_session_token_format(cookie.value()) {
        return Ok(None);
    }

    let token_hash = hash_session_token(cookie.value());

    let Some(session) = Session::find_valid(pool, &token_hash).await? else {
        return Ok(None);
    };

    let Some(user) = User::find_by_id(pool, session.user_id).await? else {
        // Session outlived its user; drop it.
        Session::delete(pool, session.id).await?;
        return Ok(None);
    };

    Ok(Some(CurrentUser { user, session }))
}
