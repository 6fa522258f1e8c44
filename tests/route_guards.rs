use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use tajroyals_api::app;
use tajroyals_api::auth::{generate_jwt, AppRole, Claims};

async fn get(path: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(path).method("GET");
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {}", token));
    }
    let response = app()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    // Extractor rejections answer in plain text, not JSON.
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn member_token(role: AppRole) -> String {
    let claims = Claims::for_member(Uuid::new_v4(), "tester".to_string(), role);
    generate_jwt(&claims).unwrap()
}

fn supervisor_token() -> String {
    generate_jwt(&Claims::for_supervisor()).unwrap()
}

fn is_guard_denial(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

#[tokio::test]
async fn anonymous_member_route_redirects_to_auth() {
    let (status, body) = get("/api/dashboard", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/auth");
    assert_eq!(body["from"], "/api/dashboard");
}

#[tokio::test]
async fn anonymous_admin_route_redirects_to_admin_login() {
    let (status, body) = get("/api/admin/badges", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/admin/login");
    assert_eq!(body["from"], "/api/admin/badges");
}

#[tokio::test]
async fn base_role_member_is_forbidden_on_admin_routes() {
    let token = member_token(AppRole::User);
    let (status, body) = get("/api/admin/badges", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["redirect"], "/dashboard");
    // Nested mounts must still report the path as the client requested it.
    assert_eq!(body["from"], "/api/admin/badges");
}

#[tokio::test]
async fn elevated_roles_pass_the_admin_guard() {
    for role in [AppRole::Admin, AppRole::SuperAdmin] {
        let token = member_token(role);
        let (status, _) = get("/api/admin/badges", Some(&token)).await;
        assert!(
            !is_guard_denial(status),
            "role {:?} should pass the admin guard, got {}",
            role,
            status
        );
    }
}

#[tokio::test]
async fn member_token_passes_member_guard() {
    let token = member_token(AppRole::User);
    let (status, _) = get("/api/dashboard", Some(&token)).await;
    assert!(!is_guard_denial(status), "got {}", status);
}

#[tokio::test]
async fn supervisor_token_does_not_open_member_or_admin_routes() {
    let token = supervisor_token();

    let (status, body) = get("/api/dashboard", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/auth");

    let (status, body) = get("/api/admin/badges", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/admin/login");
}

#[tokio::test]
async fn member_tokens_do_not_open_the_supervisor_tree() {
    // Not even the highest member role crosses into the supervisor tree.
    for role in [AppRole::User, AppRole::Admin, AppRole::SuperAdmin] {
        let token = member_token(role);
        let (status, body) = get("/api/supervisor/overview", Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "role {:?}", role);
        assert_eq!(body["redirect"], "/supervisor/login");
    }
}

#[tokio::test]
async fn supervisor_token_passes_supervisor_guard() {
    let token = supervisor_token();
    let (status, _) = get("/api/supervisor/overview", Some(&token)).await;
    assert!(!is_guard_denial(status), "got {}", status);
}

#[tokio::test]
async fn anonymous_supervisor_route_redirects_to_supervisor_login() {
    let (status, body) = get("/api/supervisor/overview", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/supervisor/login");
    assert_eq!(body["from"], "/api/supervisor/overview");
}

#[tokio::test]
async fn tampered_token_is_rejected_even_on_public_routes() {
    let mut token = member_token(AppRole::Admin);
    token.push('x');

    let (status, body) = get("/api/rides", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn public_routes_need_no_token() {
    // No database behind the tests, so a pass means reaching the handler
    // rather than being turned away by a guard.
    for path in ["/api/rides", "/api/content/hero", "/api/leaderboard"] {
        let (status, _) = get(path, None).await;
        assert!(!is_guard_denial(status), "{} got {}", path, status);
    }
}
