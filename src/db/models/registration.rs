use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RideRegistration {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub user_id: Uuid,
    pub payment_id: Option<Uuid>,
    pub payment_status: Option<String>,
    pub registered_at: DateTime<Utc>,
}

/// Registration joined with rider and ride context for console listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RegistrationDetail {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub user_id: Uuid,
    pub payment_status: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub rider_name: String,
    pub rider_email: String,
    pub rider_mobile: String,
    pub ride_title: String,
    pub ride_date: DateTime<Utc>,
}
