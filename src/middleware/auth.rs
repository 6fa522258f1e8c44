use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{validate_jwt, AppRole, Claims, TokenScope};
use crate::error::ApiError;

/// Authenticated caller context extracted from a bearer token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: AppRole,
    pub scope: TokenScope,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
            scope: claims.scope,
        }
    }
}

/// Non-rejecting bearer extraction: requests without an Authorization header
/// pass through anonymous, so public routes and the per-tree guards can each
/// decide for themselves. A header that is present but unusable is rejected
/// here rather than silently downgraded to anonymous.
pub async fn bearer_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match extract_bearer(&headers) {
        None => {}
        Some(token) => {
            let claims = validate_jwt(token).map_err(|e| {
                tracing::warn!("Rejected bearer token: {}", e);
                ApiError::unauthorized("Invalid or expired token")
            })?;
            request.extensions_mut().insert(AuthUser::from(claims));
        }
    }

    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_tokens_only() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer(&headers).is_none());

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer(&headers).is_none());

        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert!(extract_bearer(&headers).is_none());

        headers.insert("authorization", HeaderValue::from_static("Bearer tok123"));
        assert_eq!(extract_bearer(&headers), Some("tok123"));
    }
}
