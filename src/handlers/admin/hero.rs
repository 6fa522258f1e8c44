use axum::extract::{Multipart, Path};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::TokenScope;
use crate::db::models::hero_image::HeroImage;
use crate::db::pool;
use crate::error::ApiError;
use crate::handlers::read_upload_form;
use crate::middleware::AuthUser;
use crate::services::ordering;
use crate::storage;

/// GET /hero - Every carousel image, including deactivated ones
pub async fn list() -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let images = sqlx::query_as::<_, HeroImage>(
        "SELECT * FROM hero_images ORDER BY sort_order, created_at",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": images })))
}

/// POST /hero - Upload a carousel image. New images append to the end of
/// the display order. Multipart: file part plus optional alt_text field.
pub async fn upload(
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let form = read_upload_form(multipart).await?;
    let alt_text = form.field("alt_text").map(|s| s.to_string());
    let (filename, bytes) = form
        .file
        .ok_or_else(|| ApiError::bad_request("Missing file part"))?;

    let url = storage::save(storage::BUCKET_HERO_IMAGES, &filename, &bytes).await?;

    let uploaded_by = match user.scope {
        TokenScope::Member => Some(user.user_id),
        TokenScope::Supervisor => None,
    };

    let pool = pool::pool().await?;

    let current_max: Option<i32> =
        sqlx::query_scalar("SELECT max(sort_order) FROM hero_images")
            .fetch_one(&pool)
            .await?;

    let created = sqlx::query_as::<_, HeroImage>(
        r#"
        INSERT INTO hero_images (image_url, alt_text, sort_order, uploaded_by)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&url)
    .bind(&alt_text)
    .bind(ordering::next_sort_order(current_max))
    .bind(uploaded_by)
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": created })),
    ))
}

/// PATCH /hero/:id/active - Flip carousel visibility
pub async fn toggle_active(Path(id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let updated = sqlx::query_as::<_, HeroImage>(
        "UPDATE hero_images SET is_active = NOT is_active WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Hero image not found"))?;

    Ok(Json(json!({ "success": true, "data": updated })))
}

/// DELETE /hero/:id - Remove a carousel image and its stored file
pub async fn delete(Path(id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let image_url: Option<String> =
        sqlx::query_scalar("DELETE FROM hero_images WHERE id = $1 RETURNING image_url")
            .bind(id)
            .fetch_optional(&pool)
            .await?;

    let image_url = image_url.ok_or_else(|| ApiError::not_found("Hero image not found"))?;
    storage::remove_by_url(&image_url).await;

    Ok(Json(json!({ "success": true, "data": { "deleted": id } })))
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub ordered_ids: Vec<Uuid>,
}

/// PUT /hero/order - Rewrite the carousel order. The request must list
/// every image exactly once.
pub async fn reorder(Json(req): Json<ReorderRequest>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let existing: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM hero_images")
        .fetch_all(&pool)
        .await?;

    let assignments = ordering::sequential_assignments(&existing, &req.ordered_ids)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let mut tx = pool.begin().await?;
    for (id, sort_order) in assignments {
        sqlx::query("UPDATE hero_images SET sort_order = $2 WHERE id = $1")
            .bind(id)
            .bind(sort_order)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    let images = sqlx::query_as::<_, HeroImage>(
        "SELECT * FROM hero_images ORDER BY sort_order, created_at",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": images })))
}
