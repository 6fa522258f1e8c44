use axum::extract::{Multipart, Path};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::models::team_member::{TeamMember, TeamMemberUpdate};
use crate::db::pool;
use crate::error::ApiError;
use crate::handlers::read_upload_form;
use crate::services::ordering;
use crate::storage;

/// GET /api/supervisor/team - Full roster, including hidden entries
pub async fn list() -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let members = sqlx::query_as::<_, TeamMember>(
        "SELECT * FROM team_members ORDER BY sort_order, name",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": members })))
}

/// POST /api/supervisor/team - Add a roster entry. Multipart: name and
/// position fields plus an optional photo part. New entries append to the
/// end of the display order.
pub async fn create(multipart: Multipart) -> Result<(StatusCode, Json<Value>), ApiError> {
    let form = read_upload_form(multipart).await?;
    let name = form.require_field("name")?.to_string();
    let position = form.require_field("position")?.to_string();

    let photo_url = match &form.file {
        Some((filename, bytes)) => {
            Some(storage::save(storage::BUCKET_TEAM, filename, bytes).await?)
        }
        None => None,
    };

    let pool = pool::pool().await?;

    let current_max: Option<i32> =
        sqlx::query_scalar("SELECT max(sort_order) FROM team_members")
            .fetch_one(&pool)
            .await?;

    let created = sqlx::query_as::<_, TeamMember>(
        r#"
        INSERT INTO team_members (name, position, photo_url, sort_order)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&name)
    .bind(&position)
    .bind(&photo_url)
    .bind(ordering::next_sort_order(current_max))
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": created })),
    ))
}

/// PUT /api/supervisor/team/:id - Edit name or position
pub async fn update(
    Path(id): Path<Uuid>,
    Json(update): Json<TeamMemberUpdate>,
) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let member = sqlx::query_as::<_, TeamMember>(
        r#"
        UPDATE team_members SET
            name = COALESCE($2, name),
            position = COALESCE($3, position),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&update.name)
    .bind(&update.position)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Team member not found"))?;

    Ok(Json(json!({ "success": true, "data": member })))
}

/// PATCH /api/supervisor/team/:id/active - Toggle roster visibility
pub async fn toggle_active(Path(id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let member = sqlx::query_as::<_, TeamMember>(
        "UPDATE team_members SET is_active = NOT is_active, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Team member not found"))?;

    Ok(Json(json!({ "success": true, "data": member })))
}

/// DELETE /api/supervisor/team/:id - Remove a roster entry and its photo
pub async fn delete(Path(id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let photo_url: Option<Option<String>> =
        sqlx::query_scalar("DELETE FROM team_members WHERE id = $1 RETURNING photo_url")
            .bind(id)
            .fetch_optional(&pool)
            .await?;

    let photo_url = photo_url.ok_or_else(|| ApiError::not_found("Team member not found"))?;
    if let Some(url) = photo_url {
        storage::remove_by_url(&url).await;
    }

    Ok(Json(json!({ "success": true, "data": { "deleted": id } })))
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub ordered_ids: Vec<Uuid>,
}

/// PUT /api/supervisor/team/order - Rewrite the roster display order
pub async fn reorder(Json(req): Json<ReorderRequest>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let existing: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM team_members")
        .fetch_all(&pool)
        .await?;

    let assignments = ordering::sequential_assignments(&existing, &req.ordered_ids)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let mut tx = pool.begin().await?;
    for (id, sort_order) in assignments {
        sqlx::query("UPDATE team_members SET sort_order = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(sort_order)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    let members = sqlx::query_as::<_, TeamMember>(
        "SELECT * FROM team_members ORDER BY sort_order, name",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": members })))
}
