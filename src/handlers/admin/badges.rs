use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::TokenScope;
use crate::db::models::badge::{Badge, NewBadge, UserBadge};
use crate::db::pool;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// GET /badges - All badge definitions
pub async fn list() -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let badges = sqlx::query_as::<_, Badge>("SELECT * FROM badges ORDER BY created_at")
        .fetch_all(&pool)
        .await?;

    Ok(Json(json!({ "success": true, "data": badges })))
}

/// POST /badges - Define a badge
pub async fn create(
    Json(badge): Json<NewBadge>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if badge.name.trim().is_empty() {
        return Err(ApiError::bad_request("Badge name is required"));
    }

    let pool = pool::pool().await?;

    let created = sqlx::query_as::<_, Badge>(
        r#"
        INSERT INTO badges (name, description, icon_url, criteria_type, criteria_value, ride_type_criteria)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&badge.name)
    .bind(&badge.description)
    .bind(&badge.icon_url)
    .bind(&badge.criteria_type)
    .bind(badge.criteria_value)
    .bind(&badge.ride_type_criteria)
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": created })),
    ))
}

/// DELETE /badges/:id - Remove a badge definition and all awards of it
pub async fn delete(Path(badge_id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let result = sqlx::query("DELETE FROM badges WHERE id = $1")
        .bind(badge_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Badge not found"));
    }

    Ok(Json(json!({ "success": true, "data": { "deleted": badge_id } })))
}

#[derive(Debug, Deserialize)]
pub struct AwardRequest {
    pub user_id: Uuid,
}

/// POST /badges/:id/award - Hand a badge to a member outside the automatic
/// criteria. Awarding twice is a conflict, not a silent no-op.
pub async fn award(
    Extension(user): Extension<AuthUser>,
    Path(badge_id): Path<Uuid>,
    Json(req): Json<AwardRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let pool = pool::pool().await?;

    let awarded_by = match user.scope {
        TokenScope::Member => Some(user.user_id),
        TokenScope::Supervisor => None,
    };

    let awarded = sqlx::query_as::<_, UserBadge>(
        r#"
        INSERT INTO user_badges (user_id, badge_id, is_manual, awarded_by)
        VALUES ($1, $2, TRUE, $3)
        ON CONFLICT (user_id, badge_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(req.user_id)
    .bind(badge_id)
    .bind(awarded_by)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::conflict("Member already holds this badge"))?;

    tracing::info!("Badge {} awarded to {}", badge_id, req.user_id);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": awarded })),
    ))
}
