use axum::extract::Multipart;
use axum::response::Json;
use axum::Extension;
use serde_json::{json, Value};

use crate::db::models::profile::{Profile, ProfileUpdate};
use crate::db::pool;
use crate::error::ApiError;
use crate::handlers::read_upload_form;
use crate::middleware::AuthUser;
use crate::storage;

/// GET /api/profile - The caller's own profile
pub async fn get_profile(Extension(user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    Ok(Json(json!({ "success": true, "data": profile })))
}

/// PUT /api/profile - Update editable profile fields. Omitted fields keep
/// their current values; ride totals and suspension are not editable here.
pub async fn update_profile(
    Extension(user): Extension<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;
    let profile = apply_profile_update(&pool, user.user_id, &update).await?;

    tracing::info!("Profile updated for {}", user.username);
    Ok(Json(json!({ "success": true, "data": profile })))
}

/// POST /api/profile/photo - Replace the profile photo. The previous file
/// is removed from the upload store once the row points at the new one.
pub async fn upload_photo(
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = read_upload_form(multipart).await?;
    let (filename, bytes) = form
        .file
        .ok_or_else(|| ApiError::bad_request("Missing file part"))?;

    let pool = pool::pool().await?;

    let previous: Option<String> =
        sqlx::query_scalar("SELECT profile_photo_url FROM profiles WHERE id = $1")
            .bind(user.user_id)
            .fetch_one(&pool)
            .await?;

    let url = storage::save(storage::BUCKET_PROFILE_PHOTOS, &filename, &bytes).await?;

    let profile = sqlx::query_as::<_, Profile>(
        "UPDATE profiles SET profile_photo_url = $1, updated_at = now() WHERE id = $2 RETURNING *",
    )
    .bind(&url)
    .bind(user.user_id)
    .fetch_one(&pool)
    .await?;

    if let Some(old) = previous {
        storage::remove_by_url(&old).await;
    }

    Ok(Json(json!({ "success": true, "data": profile })))
}

/// Shared by the member endpoint and the supervisor user editor.
pub async fn apply_profile_update(
    pool: &sqlx::PgPool,
    user_id: uuid::Uuid,
    update: &ProfileUpdate,
) -> Result<Profile, ApiError> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        UPDATE profiles SET
            full_name         = COALESCE($2, full_name),
            mobile            = COALESCE($3, mobile),
            bike_model        = COALESCE($4, bike_model),
            blood_group       = COALESCE($5, blood_group),
            city              = COALESCE($6, city),
            country           = COALESCE($7, country),
            emergency_contact = COALESCE($8, emergency_contact),
            license_number    = COALESCE($9, license_number),
            years_driven      = COALESCE($10, years_driven),
            updated_at        = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&update.full_name)
    .bind(&update.mobile)
    .bind(&update.bike_model)
    .bind(&update.blood_group)
    .bind(&update.city)
    .bind(&update.country)
    .bind(&update.emergency_contact)
    .bind(&update.license_number)
    .bind(update.years_driven)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    Ok(profile)
}
