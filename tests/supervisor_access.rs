use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use tajroyals_api::app;
use tajroyals_api::auth::{validate_jwt, TokenScope};

async fn post_json(path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(path)
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    // Extractor rejections answer in plain text, not JSON.
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn wrong_access_code_is_rejected() {
    let (status, body) =
        post_json("/auth/supervisor/login", json!({ "access_code": "guess" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn correct_access_code_issues_a_supervisor_scoped_token() {
    // Development profile ships a known access code.
    let (status, body) = post_json(
        "/auth/supervisor/login",
        json!({ "access_code": "TAJROYALS2025SUPERVISOR" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let token = body["data"]["token"].as_str().unwrap();
    let claims = validate_jwt(token).unwrap();
    assert_eq!(claims.scope, TokenScope::Supervisor);
    assert!(claims.sub.is_nil());

    let expires_in = body["data"]["expires_in"].as_i64().unwrap();
    assert!(expires_in > 0);
    // Supervisor sessions are short-lived, not day-scale.
    assert!(expires_in <= 12 * 60 * 60);
}

#[tokio::test]
async fn issued_token_opens_the_supervisor_tree() {
    let (_, body) = post_json(
        "/auth/supervisor/login",
        json!({ "access_code": "TAJROYALS2025SUPERVISOR" }),
    )
    .await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri("/api/supervisor/overview")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    assert_ne!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_access_code_is_a_bad_request() {
    let (status, _) = post_json("/auth/supervisor/login", json!({})).await;
    // Serde rejects the body before the handler sees it.
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
