use std::collections::HashMap;

use axum::extract::{Path, Query};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::models::announcement::Announcement;
use crate::db::models::gallery::{GalleryAlbum, GalleryPhoto};
use crate::db::models::hero_image::HeroImage;
use crate::db::models::profile::Profile;
use crate::db::models::ride::Ride;
use crate::db::models::team_member::TeamMember;
use crate::db::pool;
use crate::error::ApiError;
use crate::services::leaderboard::{self, Metric};

/// GET /api/content/hero - Active hero carousel images in display order
pub async fn hero_images() -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let images = sqlx::query_as::<_, HeroImage>(
        "SELECT * FROM hero_images WHERE is_active = TRUE ORDER BY sort_order, created_at",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": images })))
}

/// GET /api/content/announcements - Active announcements, newest first
pub async fn announcements() -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let items = sqlx::query_as::<_, Announcement>(
        "SELECT * FROM announcements WHERE is_active = TRUE ORDER BY created_at DESC",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": items })))
}

/// GET /api/content/team - Active team roster in display order
pub async fn team() -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let members = sqlx::query_as::<_, TeamMember>(
        "SELECT * FROM team_members WHERE is_active = TRUE ORDER BY sort_order, name",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": members })))
}

/// GET /api/gallery/albums - All albums with per-album photo counts
pub async fn gallery_albums() -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let albums = sqlx::query_as::<_, GalleryAlbum>(
        "SELECT * FROM gallery_albums ORDER BY created_at DESC",
    )
    .fetch_all(&pool)
    .await?;

    let counts: Vec<(Uuid, i64)> = sqlx::query_as(
        "SELECT album_id, count(*) FROM gallery_photos GROUP BY album_id",
    )
    .fetch_all(&pool)
    .await?;
    let counts: HashMap<Uuid, i64> = counts.into_iter().collect();

    let data: Vec<Value> = albums
        .into_iter()
        .map(|album| {
            let photo_count = counts.get(&album.id).copied().unwrap_or(0);
            json!({ "album": album, "photo_count": photo_count })
        })
        .collect();

    Ok(Json(json!({ "success": true, "data": data })))
}

/// GET /api/gallery/albums/:id/photos - Photos of one album, newest first
pub async fn gallery_photos(Path(album_id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let album = sqlx::query_as::<_, GalleryAlbum>("SELECT * FROM gallery_albums WHERE id = $1")
        .bind(album_id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Album not found"))?;

    let photos = sqlx::query_as::<_, GalleryPhoto>(
        "SELECT * FROM gallery_photos WHERE album_id = $1 ORDER BY uploaded_at DESC",
    )
    .bind(album_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({
        "success": true,
        "data": { "album": album, "photos": photos }
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct RideListQuery {
    pub status: Option<String>,
}

/// GET /api/rides - Ride catalog, soonest first. `?status=` narrows to one
/// lifecycle state.
pub async fn list_rides(Query(query): Query<RideListQuery>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let rides = match query.status {
        Some(status) => {
            sqlx::query_as::<_, Ride>(
                "SELECT * FROM rides WHERE status = $1 ORDER BY ride_date",
            )
            .bind(status)
            .fetch_all(&pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Ride>("SELECT * FROM rides ORDER BY ride_date")
                .fetch_all(&pool)
                .await?
        }
    };

    Ok(Json(json!({ "success": true, "data": rides })))
}

/// GET /api/rides/:id - One ride with its current registration count
pub async fn get_ride(Path(ride_id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let ride = sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = $1")
        .bind(ride_id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Ride not found"))?;

    let (registered,): (i64,) =
        sqlx::query_as("SELECT count(*) FROM ride_registrations WHERE ride_id = $1")
            .bind(ride_id)
            .fetch_one(&pool)
            .await?;

    Ok(Json(json!({
        "success": true,
        "data": { "ride": ride, "registered_count": registered }
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub metric: Metric,
}

/// GET /api/leaderboard?metric=km|rides|badges - Member standings.
/// Suspended accounts are excluded from public rankings.
pub async fn leaderboard(
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let profiles = sqlx::query_as::<_, Profile>(
        "SELECT * FROM profiles WHERE is_suspended = FALSE ORDER BY total_km_ridden DESC",
    )
    .fetch_all(&pool)
    .await?;

    let counts: Vec<(Uuid, i64)> =
        sqlx::query_as("SELECT user_id, count(*) FROM user_badges GROUP BY user_id")
            .fetch_all(&pool)
            .await?;
    let counts: HashMap<Uuid, i64> = counts.into_iter().collect();

    let entries = leaderboard::rank(profiles, &counts, query.metric);

    Ok(Json(json!({ "success": true, "data": entries })))
}
