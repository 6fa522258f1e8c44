use axum::{http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::{
    generate_jwt, hash_password, verify_password, verify_supervisor_code, AppRole, Claims,
};
use crate::db::models::profile::Profile;
use crate::db::pool;
use crate::error::ApiError;
use crate::handlers::{resolve_role, session_payload};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    pub full_name: String,
    pub mobile: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SupervisorLoginRequest {
    pub access_code: String,
}

/// POST /auth/register - Create a member account
///
/// Creates the profile row plus a base role assignment. Elevated roles are
/// never self-assigned; they are granted afterwards via `clubctl grant-role`.
pub async fn register(
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate_registration(&payload)?;

    let pool = pool::pool().await?;
    let password_hash = hash_password(&payload.password)?;

    let mut tx = pool.begin().await?;

    let (email_taken,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM profiles WHERE email = $1 OR username = $2)",
    )
    .bind(&payload.email)
    .bind(&payload.username)
    .fetch_one(&mut *tx)
    .await?;
    if email_taken {
        return Err(ApiError::conflict("Email or username already registered"));
    }

    let profile = sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (email, username, password_hash, full_name, mobile, member_id, member_since)
        VALUES ($1, $2, $3, $4, $5, 'TR-' || lpad(nextval('member_id_seq')::text, 4, '0'), CURRENT_DATE)
        RETURNING *
        "#,
    )
    .bind(&payload.email)
    .bind(&payload.username)
    .bind(&password_hash)
    .bind(&payload.full_name)
    .bind(&payload.mobile)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        // A racing registration can slip past the EXISTS check and lose at
        // the unique index instead.
        if crate::error::is_unique_violation(&e) {
            ApiError::conflict("Email or username already registered")
        } else {
            e.into()
        }
    })?;

    sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, 'user')")
        .bind(profile.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Registered new member {} ({})", profile.username, profile.id);

    let claims = Claims::for_member(profile.id, profile.username.clone(), AppRole::User);
    let token = generate_jwt(&claims)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": {
                "token": token,
                "expires_in": claims.expires_in_secs(),
                "session": session_payload(&profile, AppRole::User),
            }
        })),
    ))
}

/// POST /auth/login - Authenticate a member and issue a session token
///
/// The role is resolved from the roles table at login time; a failed lookup
/// degrades to the base role instead of blocking sign-in.
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE email = $1")
        .bind(&payload.email)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    verify_password(&payload.password, &profile.password_hash)?;

    if profile.is_suspended {
        tracing::warn!("Suspended account attempted login: {}", profile.username);
        return Err(ApiError::forbidden("Account is suspended"));
    }

    let role = resolve_role(&pool, profile.id).await;
    let claims = Claims::for_member(profile.id, profile.username.clone(), role);
    let token = generate_jwt(&claims)?;

    tracing::info!("Member {} signed in (role {})", profile.username, role);

    Ok(Json(json!({
        "success": true,
        "data": {
            "token": token,
            "expires_in": claims.expires_in_secs(),
            "session": session_payload(&profile, role),
        }
    })))
}

/// POST /auth/supervisor/login - Exchange the supervisor access code for a
/// short-lived supervisor-scoped token. The code is verified server-side
/// against a configured digest; a wrong code yields nothing persistent.
pub async fn supervisor_login(
    Json(payload): Json<SupervisorLoginRequest>,
) -> Result<Json<Value>, ApiError> {
    if !verify_supervisor_code(&payload.access_code) {
        tracing::warn!("Supervisor login rejected: wrong access code");
        return Err(ApiError::unauthorized("Access denied"));
    }

    let claims = Claims::for_supervisor();
    let token = generate_jwt(&claims)?;

    tracing::info!("Supervisor access granted (expires in {}s)", claims.expires_in_secs());

    Ok(Json(json!({
        "success": true,
        "data": {
            "token": token,
            "expires_in": claims.expires_in_secs(),
        }
    })))
}

fn validate_registration(payload: &RegisterRequest) -> Result<(), ApiError> {
    let mut field_errors = HashMap::new();

    if let Err(msg) = validate_username(&payload.username) {
        field_errors.insert("username".to_string(), msg);
    }
    if let Err(msg) = validate_email(&payload.email) {
        field_errors.insert("email".to_string(), msg);
    }
    if payload.password.len() < 8 {
        field_errors.insert(
            "password".to_string(),
            "Password must be at least 8 characters".to_string(),
        );
    }
    if payload.full_name.trim().is_empty() {
        field_errors.insert("full_name".to_string(), "This field is required".to_string());
    }
    if payload.mobile.trim().is_empty() {
        field_errors.insert("mobile".to_string(), "This field is required".to_string());
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error(
            "Invalid registration details",
            Some(field_errors),
        ))
    }
}

fn validate_username(username: &str) -> Result<(), String> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }
    if username.len() > 50 {
        return Err("Username must be less than 50 characters".to_string());
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        return Err(
            "Username can only contain letters, numbers, underscore, and hyphen".to_string(),
        );
    }
    if !username.chars().next().is_some_and(|c| c.is_alphanumeric()) {
        return Err("Username must start with a letter or number".to_string());
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), String> {
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() || !parts[1].contains('.') {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username("rider_42").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("_leading").is_err());
        assert!(validate_username("bad space").is_err());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("rider@club.example").is_ok());
        assert!(validate_email("rider@club").is_err());
        assert!(validate_email("@club.example").is_err());
        assert!(validate_email("riderclub.example").is_err());
    }

    #[test]
    fn registration_validation_collects_field_errors() {
        let bad = RegisterRequest {
            email: "nope".to_string(),
            password: "short".to_string(),
            username: "x".to_string(),
            full_name: "".to_string(),
            mobile: "".to_string(),
        };
        let err = validate_registration(&bad).unwrap_err();
        match err {
            ApiError::ValidationError { field_errors, .. } => {
                let fields = field_errors.unwrap();
                assert_eq!(fields.len(), 5);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
