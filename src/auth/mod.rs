use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

/// Club role as stored in the `user_roles` table (Postgres enum `app_role`).
///
/// Capability checks match exhaustively so an impossible combination such as
/// "admin but not elevated" cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "app_role", rename_all = "snake_case")]
pub enum AppRole {
    User,
    Admin,
    SuperAdmin,
}

impl AppRole {
    /// Admin console access: admins and super admins qualify.
    pub fn can_administer(self) -> bool {
        match self {
            AppRole::User => false,
            AppRole::Admin | AppRole::SuperAdmin => true,
        }
    }

    pub fn is_super_admin(self) -> bool {
        match self {
            AppRole::User | AppRole::Admin => false,
            AppRole::SuperAdmin => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppRole::User => "user",
            AppRole::Admin => "admin",
            AppRole::SuperAdmin => "super_admin",
        }
    }
}

impl std::str::FromStr for AppRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(AppRole::User),
            "admin" => Ok(AppRole::Admin),
            "super_admin" => Ok(AppRole::SuperAdmin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for AppRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which gate a token opens. Member tokens come from credential login and
/// carry the resolved role; supervisor tokens come from the access-code login
/// and open only the supervisor tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScope {
    Member,
    Supervisor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Profile id; nil for supervisor tokens, which are not tied to identity.
    pub sub: Uuid,
    pub username: String,
    pub role: AppRole,
    pub scope: TokenScope,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn for_member(user_id: Uuid, username: String, role: AppRole) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        Self {
            sub: user_id,
            username,
            role,
            scope: TokenScope::Member,
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Supervisor grants are deliberately short-lived; the access code is a
    /// shared secret, so the resulting token must not outlive a work session.
    pub fn for_supervisor() -> Self {
        let now = Utc::now();
        let ttl = config::config().security.supervisor_token_ttl_minutes;
        Self {
            sub: Uuid::nil(),
            username: "supervisor".to_string(),
            role: AppRole::User,
            scope: TokenScope::Supervisor,
            exp: (now + Duration::minutes(ttl)).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn expires_in_secs(&self) -> i64 {
        self.exp - self.iat
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("password hash error: {0}")]
    Hash(String),

    #[error("token generation error: {0}")]
    TokenGeneration(String),
}

pub fn generate_jwt(claims: &Claims) -> Result<String, AuthError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str) -> Result<Claims, AuthError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Compare a submitted supervisor access code against the configured digest.
pub fn verify_supervisor_code(submitted: &str) -> bool {
    let expected = &config::config().security.supervisor_code_digest;
    if expected.is_empty() {
        return false;
    }
    crate::config::sha256_hex(submitted) == *expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_capability_matrix() {
        assert!(!AppRole::User.can_administer());
        assert!(AppRole::Admin.can_administer());
        assert!(AppRole::SuperAdmin.can_administer());
        assert!(!AppRole::User.is_super_admin());
        assert!(!AppRole::Admin.is_super_admin());
        assert!(AppRole::SuperAdmin.is_super_admin());
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [AppRole::User, AppRole::Admin, AppRole::SuperAdmin] {
            assert_eq!(role.as_str().parse::<AppRole>().unwrap(), role);
        }
        assert!("owner".parse::<AppRole>().is_err());
    }

    #[test]
    fn member_token_round_trips() {
        let user_id = Uuid::new_v4();
        let claims = Claims::for_member(user_id, "rider42".to_string(), AppRole::Admin);
        let token = generate_jwt(&claims).unwrap();
        let decoded = validate_jwt(&token).unwrap();
        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.username, "rider42");
        assert_eq!(decoded.role, AppRole::Admin);
        assert_eq!(decoded.scope, TokenScope::Member);
    }

    #[test]
    fn supervisor_token_is_scoped_and_anonymous() {
        let claims = Claims::for_supervisor();
        assert_eq!(claims.sub, Uuid::nil());
        assert_eq!(claims.scope, TokenScope::Supervisor);
        let ttl_minutes = crate::config::config().security.supervisor_token_ttl_minutes;
        assert_eq!(claims.expires_in_secs(), ttl_minutes * 60);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let claims = Claims::for_member(Uuid::new_v4(), "rider".to_string(), AppRole::User);
        let mut token = generate_jwt(&claims).unwrap();
        token.push('x');
        assert!(validate_jwt(&token).is_err());
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("throttle-open").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("throttle-open", &hash).is_ok());
        assert!(matches!(
            verify_password("throttle-closed", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn supervisor_code_check_uses_configured_digest() {
        // Development config seeds the default code.
        assert!(verify_supervisor_code("TAJROYALS2025SUPERVISOR"));
        assert!(!verify_supervisor_code("WRONGCODE"));
        assert!(!verify_supervisor_code(""));
    }
}
