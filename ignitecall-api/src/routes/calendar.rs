/// Connect-calendar OAuth flow
///
/// The connect-calendar registration step needs three things from the
/// server: the current connection state (to render "Conectado" and gate the
/// next step), an authorization URL to send the user to, and a callback that
/// records the grant. Provider failures are reported back to the page via an
/// `error` query parameter on the redirect, never as an API error, because
/// the browser is mid-redirect when they happen.
///
/// # Endpoints
///
/// - `GET /api/integrations/calendar` - Connection state for the session user
/// - `POST /api/integrations/calendar/connect` - Build the authorize URL
/// - `GET /api/integrations/calendar/callback` - Provider redirect target
///
/// Token refresh is intentionally absent; only the access token granted at
/// connect time is stored.

use crate::{
    app::{resolve_session, AppState, CurrentUser},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    response::Redirect,
    Extension, Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use ignitecall_shared::{
    auth::session_token::{generate_oauth_state, hash_oauth_state},
    models::{
        calendar_connection::{CalendarConnection, CreateCalendarConnection},
        session::Session,
    },
};
use serde::{Deserialize, Serialize};

/// Scopes requested from Google: identify the account and read the calendar
const CALENDAR_SCOPES: &str =
    "https://www.googleapis.com/auth/userinfo.email https://www.googleapis.com/auth/calendar";

/// Provider identifier stored on connections
const PROVIDER: &str = "google";

/// Connection state response
#[derive(Debug, Serialize)]
pub struct CalendarStatusResponse {
    /// Whether a calendar is connected for the current user
    pub connected: bool,

    /// Provider of the connection, when connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// When the calendar was connected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_at: Option<DateTime<Utc>>,
}

/// Connect response
#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    /// Provider consent-screen URL the client should navigate to
    pub authorize_url: String,
}

/// Query parameters Google sends to the callback
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code, present on success
    pub code: Option<String>,

    /// Echo of the state we sent, bound to the session
    pub state: Option<String>,

    /// Provider error code (e.g. "access_denied"), present on failure
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserinfoResponse {
    id: String,
}

/// Connection state handler
///
/// # Endpoint
///
/// ```text
/// GET /api/integrations/calendar
/// ```
///
/// # Response
///
/// ```json
/// { "connected": true, "provider": "google", "connected_at": "..." }
/// ```
pub async fn status(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<CalendarStatusResponse>> {
    let connection = CalendarConnection::find_by_user(&state.db, current.user.id).await?;

    Ok(Json(match connection {
        Some(c) => CalendarStatusResponse {
            connected: true,
            provider: Some(c.provider),
            connected_at: Some(c.created_at),
        },
        None => CalendarStatusResponse {
            connected: false,
            provider: None,
            connected_at: None,
        },
    }))
}

/// Connect handler
///
/// Builds the provider consent-screen URL. The `state` parameter is a fresh
/// per-flow random value whose hash is stored on the session, so the
/// callback can verify the flow was started by the same session it lands on
/// without any stored lookup key appearing in provider URLs or browser
/// history.
///
/// # Endpoint
///
/// ```text
/// POST /api/integrations/calendar/connect
/// ```
///
/// # Response
///
/// ```json
/// { "authorize_url": "https://accounts.google.com/o/oauth2/v2/auth?..." }
/// ```
pub async fn connect(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<ConnectResponse>> {
    let google = &state.config.google;

    let (flow_state, state_hash) = generate_oauth_state();
    Session::set_oauth_state(&state.db, current.session.id, &state_hash).await?;

    let authorize_url = reqwest::Url::parse_with_params(
        &google.auth_url,
        &[
            ("client_id", google.client_id.as_str()),
            ("redirect_uri", google.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", CALENDAR_SCOPES),
            ("access_type", "online"),
            ("state", flow_state.as_str()),
        ],
    )
    .map_err(|e| ApiError::InternalError(format!("Invalid authorize URL: {}", e)))?;

    Ok(Json(ConnectResponse {
        authorize_url: authorize_url.into(),
    }))
}

/// OAuth callback handler
///
/// Every outcome is a redirect back to the frontend connect-calendar page;
/// failures carry an `error` query parameter naming the failure class:
///
/// - `permissions`: the provider reported an error (consent denied or scopes
///   missing)
/// - `session`: no live session accompanied the callback
/// - `state`: the state parameter did not match the one issued to the
///   session, or was already consumed
/// - `exchange`: the code-for-token exchange or userinfo fetch failed
///
/// # Endpoint
///
/// ```text
/// GET /api/integrations/calendar/callback?code=...&state=...
/// GET /api/integrations/calendar/callback?error=access_denied
/// ```
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Redirect> {
    let page = state.config.connect_calendar_url();

    if let Some(provider_error) = query.error {
        tracing::warn!(error = %provider_error, "Calendar provider reported an authorization error");
        return Ok(Redirect::to(&format!("{}?error=permissions", page)));
    }

    let Some(current) = resolve_session(&state.db, &jar).await? else {
        return Ok(Redirect::to(&format!("{}?error=session", page)));
    };

    let provided_hash = query.state.as_deref().map(hash_oauth_state);
    let state_matches = matches!(
        (&current.session.oauth_state_hash, &provided_hash),
        (Some(expected), Some(given)) if expected == given
    );
    if !state_matches {
        tracing::warn!(user_id = %current.user.id, "Callback state does not match session");
        return Ok(Redirect::to(&format!("{}?error=state", page)));
    }

    // Consume the state before the exchange; a replayed callback lands in
    // the mismatch branch above.
    Session::clear_oauth_state(&state.db, current.session.id).await?;

    let Some(code) = query.code else {
        return Ok(Redirect::to(&format!("{}?error=exchange", page)));
    };

    match exchange_code(&state, &code).await {
        Ok((provider_account_id, access_token)) => {
            CalendarConnection::upsert(
                &state.db,
                CreateCalendarConnection {
                    user_id: current.user.id,
                    provider: PROVIDER.to_string(),
                    provider_account_id,
                    access_token,
                },
            )
            .await?;

            tracing::info!(user_id = %current.user.id, "Calendar connected");
            Ok(Redirect::to(&page))
        }
        Err(e) => {
            tracing::warn!(user_id = %current.user.id, error = %e, "Code exchange failed");
            Ok(Redirect::to(&format!("{}?error=exchange", page)))
        }
    }
}

/// Exchanges an authorization code for an access token and identifies the
/// account it belongs to
async fn exchange_code(state: &AppState, code: &str) -> Result<(String, String), ApiError> {
    let google = &state.config.google;

    let token: TokenResponse = state
        .http
        .post(&google.token_url)
        .form(&[
            ("code", code),
            ("client_id", google.client_id.as_str()),
            ("client_secret", google.client_secret.as_str()),
            ("redirect_uri", google.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let userinfo: UserinfoResponse = state
        .http
        .get(&google.userinfo_url)
        .bearer_auth(&token.access_token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok((userinfo.id, token.access_token))
}
