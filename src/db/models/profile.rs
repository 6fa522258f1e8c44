use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Rider profile, credentials included; `password_hash` never serializes.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub mobile: String,
    pub member_id: Option<String>,
    pub bike_model: Option<String>,
    pub blood_group: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub emergency_contact: Option<String>,
    pub license_number: Option<String>,
    pub member_since: Option<NaiveDate>,
    pub profile_photo_url: Option<String>,
    pub years_driven: Option<i32>,
    pub total_km_ridden: f64,
    pub total_rides_completed: i32,
    pub is_suspended: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields a member (or supervisor) may edit. Totals and suspension
/// are managed by their own operations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub mobile: Option<String>,
    pub bike_model: Option<String>,
    pub blood_group: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub emergency_contact: Option<String>,
    pub license_number: Option<String>,
    pub years_driven: Option<i32>,
}
