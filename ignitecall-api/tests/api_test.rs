/// Integration tests for the Ignite Call API
///
/// These drive the full router (routing, validation, session middleware,
/// error envelope) without a database; scenarios that persist rows live in
/// `registration_db_test.rs` and the model tests under
/// `ignitecall-shared/tests/`, which run against a real PostgreSQL instance
/// when `DATABASE_URL` is set.

mod common;

use axum::http::StatusCode;
use common::{body_json, empty_request, json_request, TestContext};
use serde_json::json;
use tower::ServiceExt as _;

#[tokio::test]
async fn test_register_rejects_non_post_methods() {
    let ctx = TestContext::new();

    for method in ["GET", "PUT", "DELETE", "PATCH"] {
        let response = ctx
            .app
            .clone()
            .oneshot(empty_request(method, "/api/users"))
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "expected 405 for {}",
            method
        );

        // Method-not-allowed carries no body.
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }
}

#[tokio::test]
async fn test_register_rejects_short_username() {
    let ctx = TestContext::new();

    // "jd" is blocked by the schema before any persistence access.
    let response = ctx
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            json!({ "username": "jd", "name": "John Doe" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"]
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d["field"] == "username"));
}

#[tokio::test]
async fn test_register_rejects_invalid_username_characters() {
    let ctx = TestContext::new();

    for username in ["john_doe", "john doe", "user123"] {
        let response = ctx
            .app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/users",
                json!({ "username": username, "name": "John Doe" }),
            ))
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "expected {:?} to be rejected",
            username
        );
    }
}

#[tokio::test]
async fn test_register_rejects_short_name() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            json!({ "username": "john-doe", "name": "Jo" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert!(body["details"]
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d["field"] == "name"));
}

#[tokio::test]
async fn test_availability_rejects_invalid_username() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .clone()
        .oneshot(empty_request("GET", "/api/users/x/availability"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_sessions_me_requires_session_cookie() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .clone()
        .oneshot(empty_request("GET", "/api/sessions/me"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_sessions_me_rejects_malformed_token_without_lookup() {
    let ctx = TestContext::new();

    // A bare identifier (the pre-redesign cookie value) is not a token we
    // issue; the format gate rejects it before any session lookup.
    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/api/sessions/me")
        .header(
            axum::http::header::COOKIE,
            "@ignitecall:userId=4f9d3a1e-8c1b-4f6a-9e2d-1c3b5a7d9e0f",
        )
        .body(axum::body::Body::empty())
        .unwrap();

    let response = ctx.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_requires_session_cookie() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .clone()
        .oneshot(empty_request("DELETE", "/api/sessions"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_calendar_status_requires_session_cookie() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .clone()
        .oneshot(empty_request("GET", "/api/integrations/calendar"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_calendar_connect_requires_session_cookie() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .clone()
        .oneshot(empty_request("POST", "/api/integrations/calendar/connect"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_callback_provider_error_redirects_with_permissions_error() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .clone()
        .oneshot(empty_request(
            "GET",
            "/api/integrations/calendar/callback?error=access_denied",
        ))
        .await
        .unwrap();

    assert!(response.status().is_redirection());

    let location = response
        .headers()
        .get(axum::http::header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(
        location,
        "http://localhost:3000/register/connect-calendar?error=permissions"
    );
}

#[tokio::test]
async fn test_callback_without_session_redirects_with_session_error() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .clone()
        .oneshot(empty_request(
            "GET",
            "/api/integrations/calendar/callback?code=abc&state=def",
        ))
        .await
        .unwrap();

    assert!(response.status().is_redirection());

    let location = response
        .headers()
        .get(axum::http::header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(
        location,
        "http://localhost:3000/register/connect-calendar?error=session"
    );
}

#[tokio::test]
async fn test_health_reports_degraded_without_database() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .clone()
        .oneshot(empty_request("GET", "/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "disconnected");
}
