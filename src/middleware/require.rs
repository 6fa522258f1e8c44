use axum::{
    extract::{OriginalUri, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::auth::TokenScope;
use super::auth::AuthUser;

/// Per-tree guards. Each is a pure request-time check: it inspects the
/// extracted caller (if any) and either passes the request through or
/// answers with 401/403. The `redirect` field tells a client where the
/// corresponding page gate would have navigated; `from` records the
/// originally requested path.
///
/// The three guards are independent and do not compose: a supervisor token
/// does not open member or admin routes, and no role opens the supervisor
/// tree.

/// Member tree: any authenticated member qualifies.
pub async fn require_member(request: Request, next: Next) -> Result<Response, Response> {
    let from = original_path(&request);
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.scope == TokenScope::Member => Ok(next.run(request).await),
        _ => Err(deny(
            StatusCode::UNAUTHORIZED,
            "Sign in required",
            "/auth",
            &from,
        )),
    }
}

/// Admin tree: unauthenticated callers are sent to the admin login;
/// authenticated members without an elevated role are sent back to their
/// dashboard rather than to a login they are already past.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, Response> {
    let from = original_path(&request);
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.scope == TokenScope::Member => {
            if user.role.can_administer() {
                Ok(next.run(request).await)
            } else {
                tracing::warn!(
                    "Denied admin route {} to {} (role {})",
                    from,
                    user.username,
                    user.role
                );
                Err(deny(
                    StatusCode::FORBIDDEN,
                    "Admin access required",
                    "/dashboard",
                    &from,
                ))
            }
        }
        _ => Err(deny(
            StatusCode::UNAUTHORIZED,
            "Admin sign in required",
            "/admin/login",
            &from,
        )),
    }
}

/// Supervisor tree: only tokens issued by the supervisor access-code login
/// qualify, regardless of any member role.
pub async fn require_supervisor(request: Request, next: Next) -> Result<Response, Response> {
    let from = original_path(&request);
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.scope == TokenScope::Supervisor => Ok(next.run(request).await),
        _ => Err(deny(
            StatusCode::UNAUTHORIZED,
            "Supervisor access required",
            "/supervisor/login",
            &from,
        )),
    }
}

/// Path as the client sent it. Nested routers see a stripped URI, so the
/// `from` hint must come from the original request line.
fn original_path(request: &Request) -> String {
    match request.extensions().get::<OriginalUri>() {
        Some(uri) => uri.path().to_string(),
        None => request.uri().path().to_string(),
    }
}

fn deny(status: StatusCode, message: &str, redirect: &str, from: &str) -> Response {
    let code = if status == StatusCode::FORBIDDEN {
        "FORBIDDEN"
    } else {
        "UNAUTHORIZED"
    };
    (
        status,
        Json(json!({
            "error": true,
            "code": code,
            "message": message,
            "redirect": redirect,
            "from": from,
        })),
    )
        .into_response()
}
