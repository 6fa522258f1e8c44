use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Badge {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon_url: Option<String>,
    pub criteria_type: String,
    pub criteria_value: Option<i32>,
    pub ride_type_criteria: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBadge {
    pub name: String,
    pub description: String,
    pub icon_url: Option<String>,
    pub criteria_type: String,
    pub criteria_value: Option<i32>,
    pub ride_type_criteria: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserBadge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub badge_id: Uuid,
    pub earned_at: DateTime<Utc>,
    pub is_manual: bool,
    pub awarded_by: Option<Uuid>,
}

/// Earned badge joined with its definition for member-facing listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EarnedBadge {
    pub badge_id: Uuid,
    pub name: String,
    pub description: String,
    pub icon_url: Option<String>,
    pub earned_at: DateTime<Utc>,
    pub is_manual: bool,
}
