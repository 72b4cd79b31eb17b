/// User registration endpoints
///
/// The registration form's declarative schema (username min 3 chars, letters
/// and hyphens only, folded to lowercase; name min 3 chars) is enforced here
/// server-side, so the contract holds for any client.
///
/// # Endpoints
///
/// - `POST /api/users` - Register a new user and establish a session
/// - `GET /api/users/:username/availability` - Username availability check

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use ignitecall_shared::{
    auth::session_token::{generate_session_token, SESSION_COOKIE, SESSION_TTL_SECONDS},
    models::{
        session::Session,
        user::{CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired handle; folded to lowercase before storage
    #[validate(
        length(min = 3, message = "Username must be at least 3 characters"),
        custom(function = validate_username_charset)
    )]
    pub username: String,

    /// Display name
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: String,
}

/// Availability response
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// The username that was checked (lowercase)
    pub username: String,

    /// Whether no registered user holds it
    pub available: bool,
}

/// Letters and hyphens only, matching the form schema `^[A-Za-z-]+$`
fn validate_username_charset(username: &str) -> Result<(), ValidationError> {
    if username.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
        Ok(())
    } else {
        let mut error = ValidationError::new("username_charset");
        error.message = Some("Username may only contain letters and hyphens".into());
        Err(error)
    }
}

/// Register a new user
///
/// Inserts directly and treats the `users_username_key` unique-index
/// violation as the duplicate signal; there is no check-then-insert window.
/// On success a session is established: the response carries the
/// `@ignitecall:userId` cookie holding an opaque session token
/// (Max-Age 604800, Path=/, HttpOnly, SameSite=Lax).
///
/// # Endpoint
///
/// ```text
/// POST /api/users
/// Content-Type: application/json
///
/// { "username": "john-doe", "name": "John Doe" }
/// ```
///
/// # Response
///
/// `201 Created` with the persisted record:
///
/// ```json
/// {
///   "id": "uuid",
///   "username": "john-doe",
///   "name": "John Doe",
///   "created_at": "...",
///   "updated_at": "..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: username already taken (`username_taken`)
/// - `405 Method Not Allowed`: any non-POST verb, empty body
/// - `422 Unprocessable Entity`: schema validation failed
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<User>)> {
    req.validate()?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username.to_lowercase(),
            name: req.name,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    let (token, token_hash) = generate_session_token();
    Session::create(&state.db, user.id, &token_hash, SESSION_TTL_SECONDS).await?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .max_age(time::Duration::seconds(SESSION_TTL_SECONDS))
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((StatusCode::CREATED, jar.add(cookie), Json(user)))
}

/// Username availability check
///
/// Serves the registration form's pre-fill flow: the client asks before
/// submitting whether the handle is free. Advisory only; the unique index
/// still decides at insert time.
///
/// # Endpoint
///
/// ```text
/// GET /api/users/:username/availability
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: the username fails the schema rules
pub async fn availability(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<AvailabilityResponse>> {
    let mut details = Vec::new();
    if username.chars().count() < 3 {
        details.push(ValidationErrorDetail {
            field: "username".to_string(),
            message: "Username must be at least 3 characters".to_string(),
        });
    }
    if validate_username_charset(&username).is_err() {
        details.push(ValidationErrorDetail {
            field: "username".to_string(),
            message: "Username may only contain letters and hyphens".to_string(),
        });
    }
    if !details.is_empty() {
        return Err(ApiError::ValidationError(details));
    }

    let username = username.to_lowercase();
    let taken = User::username_exists(&state.db, &username).await?;

    Ok(Json(AvailabilityResponse {
        username,
        available: !taken,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, name: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_valid_usernames() {
        assert!(request("john-doe", "John Doe").validate().is_ok());
        assert!(request("abc", "abc").validate().is_ok());
        // Uppercase is accepted by the schema and folded later.
        assert!(request("John-Doe", "John Doe").validate().is_ok());
    }

    #[test]
    fn test_username_too_short() {
        let errors = request("jd", "John Doe").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn test_username_rejects_invalid_characters() {
        for username in ["john_doe", "john doe", "john.doe", "john1", "joão"] {
            let result = request(username, "John Doe").validate();
            assert!(result.is_err(), "expected {:?} to be rejected", username);
        }
    }

    #[test]
    fn test_name_too_short() {
        let errors = request("john-doe", "Jo").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_charset_allows_hyphens_only_as_special() {
        assert!(validate_username_charset("john-doe").is_ok());
        assert!(validate_username_charset("j-d").is_ok());
        assert!(validate_username_charset("john doe").is_err());
    }
}
