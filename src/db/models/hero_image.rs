use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HeroImage {
    pub id: Uuid,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
