use axum::extract::{Multipart, Path};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::TokenScope;
use crate::db::models::gallery::{GalleryAlbum, GalleryPhoto, NewAlbum};
use crate::db::pool;
use crate::error::ApiError;
use crate::handlers::read_upload_form;
use crate::middleware::AuthUser;
use crate::storage;

/// POST /gallery/albums - Create an album
pub async fn create_album(
    Extension(user): Extension<AuthUser>,
    Json(album): Json<NewAlbum>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if album.title.trim().is_empty() {
        return Err(ApiError::bad_request("Album title is required"));
    }

    let created_by = match user.scope {
        TokenScope::Member => Some(user.user_id),
        TokenScope::Supervisor => None,
    };

    let pool = pool::pool().await?;
    let created = sqlx::query_as::<_, GalleryAlbum>(
        r#"
        INSERT INTO gallery_albums (title, description, category, created_by)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&album.title)
    .bind(&album.description)
    .bind(&album.category)
    .bind(created_by)
    .fetch_one(&pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": created })),
    ))
}

/// DELETE /gallery/albums/:id - Remove an album, its photo rows, and every
/// stored file behind them
pub async fn delete_album(Path(album_id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let urls: Vec<String> =
        sqlx::query_scalar("SELECT photo_url FROM gallery_photos WHERE album_id = $1")
            .bind(album_id)
            .fetch_all(&pool)
            .await?;

    let result = sqlx::query("DELETE FROM gallery_albums WHERE id = $1")
        .bind(album_id)
        .execute(&pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Album not found"));
    }

    for url in urls {
        storage::remove_by_url(&url).await;
    }

    tracing::info!("Album {} deleted", album_id);
    Ok(Json(json!({ "success": true, "data": { "deleted": album_id } })))
}

/// POST /gallery/albums/:id/photos - Add a photo to an album. The first
/// photo becomes the album cover. Multipart: file part plus optional
/// caption field.
pub async fn upload_photo(
    Extension(user): Extension<AuthUser>,
    Path(album_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let form = read_upload_form(multipart).await?;
    let caption = form.field("caption").map(|s| s.to_string());
    let (filename, bytes) = form
        .file
        .ok_or_else(|| ApiError::bad_request("Missing file part"))?;

    let pool = pool::pool().await?;

    let cover: Option<Option<String>> =
        sqlx::query_scalar("SELECT cover_photo_url FROM gallery_albums WHERE id = $1")
            .bind(album_id)
            .fetch_optional(&pool)
            .await?;
    let cover = cover.ok_or_else(|| ApiError::not_found("Album not found"))?;

    let url = storage::save(storage::BUCKET_GALLERY, &filename, &bytes).await?;

    let uploaded_by = match user.scope {
        TokenScope::Member => Some(user.user_id),
        TokenScope::Supervisor => None,
    };

    let photo = sqlx::query_as::<_, GalleryPhoto>(
        r#"
        INSERT INTO gallery_photos (album_id, photo_url, caption, uploaded_by)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(album_id)
    .bind(&url)
    .bind(&caption)
    .bind(uploaded_by)
    .fetch_one(&pool)
    .await?;

    if cover.is_none() {
        sqlx::query(
            "UPDATE gallery_albums SET cover_photo_url = $2, updated_at = now() WHERE id = $1",
        )
        .bind(album_id)
        .bind(&url)
        .execute(&pool)
        .await?;
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": photo })),
    ))
}

/// DELETE /gallery/photos/:id - Remove one photo and its stored file
pub async fn delete_photo(Path(photo_id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let photo_url: Option<String> =
        sqlx::query_scalar("DELETE FROM gallery_photos WHERE id = $1 RETURNING photo_url")
            .bind(photo_id)
            .fetch_optional(&pool)
            .await?;

    let photo_url = photo_url.ok_or_else(|| ApiError::not_found("Photo not found"))?;
    storage::remove_by_url(&photo_url).await;

    Ok(Json(json!({ "success": true, "data": { "deleted": photo_id } })))
}
