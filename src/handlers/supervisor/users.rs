use axum::extract::Path;
use axum::response::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::models::profile::ProfileUpdate;
use crate::db::pool;
use crate::error::ApiError;
use crate::handlers::member::profile::apply_profile_update;

/// GET /api/supervisor/users - Every member with their resolved role
pub async fn list() -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let rows: Vec<(Value,)> = sqlx::query_as(
        r#"
        SELECT to_jsonb(p) - 'password_hash'
               || jsonb_build_object('role', COALESCE(ur.role::text, 'user'))
        FROM profiles p
        LEFT JOIN user_roles ur ON ur.user_id = p.id
        ORDER BY p.created_at DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let users: Vec<Value> = rows.into_iter().map(|(v,)| v).collect();
    Ok(Json(json!({ "success": true, "data": users })))
}

/// PUT /api/supervisor/users/:id - Edit a member's profile fields
pub async fn update(
    Path(user_id): Path<Uuid>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;
    let profile = apply_profile_update(&pool, user_id, &update).await?;

    tracing::info!("Supervisor edited profile {}", user_id);
    Ok(Json(json!({ "success": true, "data": profile })))
}

/// PATCH /api/supervisor/users/:id/suspend - Toggle account suspension.
/// A suspended member cannot sign in or hold a live session.
pub async fn toggle_suspend(Path(user_id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let suspended: Option<bool> = sqlx::query_scalar(
        r#"
        UPDATE profiles SET is_suspended = NOT is_suspended, updated_at = now()
        WHERE id = $1
        RETURNING is_suspended
        "#,
    )
    .bind(user_id)
    .fetch_optional(&pool)
    .await?;

    let suspended = suspended.ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::warn!(
        "User {} {}",
        user_id,
        if suspended { "suspended" } else { "reinstated" }
    );
    Ok(Json(json!({
        "success": true,
        "data": { "user_id": user_id, "is_suspended": suspended }
    })))
}

/// DELETE /api/supervisor/users/:id - Remove an account. Registrations,
/// roles, and badge awards go with it by cascade.
pub async fn delete(Path(user_id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
        .bind(user_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::warn!("User {} deleted", user_id);
    Ok(Json(json!({ "success": true, "data": { "deleted": user_id } })))
}
