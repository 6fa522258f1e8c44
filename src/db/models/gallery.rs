use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GalleryAlbum {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub cover_photo_url: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAlbum {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GalleryPhoto {
    pub id: Uuid,
    pub album_id: Uuid,
    pub photo_url: String,
    pub caption: Option<String>,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}
