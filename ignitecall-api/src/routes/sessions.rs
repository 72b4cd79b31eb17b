/// Session endpoints
///
/// The registration screens derive their state (who is signed in, whether to
/// gate the next step) from the session; these endpoints expose that state.
///
/// # Endpoints
///
/// - `GET /api/sessions/me` - Resolve the session cookie to the current user
/// - `DELETE /api/sessions` - Logout: delete the session and clear the cookie

use crate::{
    app::{AppState, CurrentUser},
    error::ApiResult,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use ignitecall_shared::{
    auth::session_token::SESSION_COOKIE,
    models::{session::Session, user::User},
};

/// Current user handler
///
/// # Endpoint
///
/// ```text
/// GET /api/sessions/me
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: cookie absent, unknown, or expired
pub async fn me(Extension(current): Extension<CurrentUser>) -> ApiResult<Json<User>> {
    Ok(Json(current.user))
}

/// Logout handler
///
/// Deletes the session row so the token stops resolving server-side, and
/// clears the cookie client-side.
///
/// # Endpoint
///
/// ```text
/// DELETE /api/sessions
/// ```
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    jar: CookieJar,
) -> ApiResult<(StatusCode, CookieJar)> {
    Session::delete(&state.db, current.session.id).await?;

    tracing::info!(user_id = %current.user.id, "Session terminated");

    // Removal must carry the same path the cookie was set with.
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());

    Ok((StatusCode::NO_CONTENT, jar))
}
