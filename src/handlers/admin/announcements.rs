use axum::extract::{Multipart, Path};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::TokenScope;
use crate::db::models::announcement::Announcement;
use crate::db::pool;
use crate::error::ApiError;
use crate::handlers::read_upload_form;
use crate::middleware::AuthUser;
use crate::storage;

/// GET /announcements - Every announcement, active or not
pub async fn list() -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let items = sqlx::query_as::<_, Announcement>(
        "SELECT * FROM announcements ORDER BY created_at DESC",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": items })))
}

/// POST /announcements - Publish an announcement. Multipart: title and
/// description fields, optional show_as_popup flag and photo part.
pub async fn create(
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let form = read_upload_form(multipart).await?;
    let title = form.require_field("title")?.to_string();
    let description = form.require_field("description")?.to_string();
    let show_as_popup = form.bool_field("show_as_popup");

    let photo_url = match &form.file {
        Some((filename, bytes)) => {
            Some(storage::save(storage::BUCKET_ANNOUNCEMENTS, filename, bytes).await?)
        }
        None => None,
    };

    let created_by = match user.scope {
        TokenScope::Member => Some(user.user_id),
        TokenScope::Supervisor => None,
    };

    let pool = pool::pool().await?;
    let created = sqlx::query_as::<_, Announcement>(
        r#"
        INSERT INTO announcements (title, description, photo_url, show_as_popup, created_by)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&title)
    .bind(&description)
    .bind(&photo_url)
    .bind(show_as_popup)
    .bind(created_by)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Announcement published: {}", created.title);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": created })),
    ))
}

/// PATCH /announcements/:id/active - Flip visibility
pub async fn toggle_active(Path(id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let updated = sqlx::query_as::<_, Announcement>(
        "UPDATE announcements SET is_active = NOT is_active, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Announcement not found"))?;

    Ok(Json(json!({ "success": true, "data": updated })))
}

/// DELETE /announcements/:id - Remove an announcement and its stored photo
pub async fn delete(Path(id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let photo_url: Option<Option<String>> = sqlx::query_scalar(
        "DELETE FROM announcements WHERE id = $1 RETURNING photo_url",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?;

    let photo_url = photo_url.ok_or_else(|| ApiError::not_found("Announcement not found"))?;
    if let Some(url) = photo_url {
        storage::remove_by_url(&url).await;
    }

    Ok(Json(json!({ "success": true, "data": { "deleted": id } })))
}
