use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Ride {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub ride_type: String,
    pub difficulty: String,
    pub distance: f64,
    pub start_point: String,
    pub end_point: String,
    pub ride_date: DateTime<Utc>,
    pub route_map_link: Option<String>,
    pub participation_fee: Option<Decimal>,
    pub registration_limit: Option<i32>,
    pub spots_available: Option<i32>,
    pub status: String,
    /// Set the first time the ride reaches Completed; rider totals are
    /// credited only on that transition.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle states a ride moves through on the management console.
pub const RIDE_STATUSES: &[&str] = &["Open", "Closed", "Completed", "Cancelled"];

#[derive(Debug, Clone, Deserialize)]
pub struct NewRide {
    pub title: String,
    pub description: Option<String>,
    pub ride_type: String,
    pub difficulty: String,
    pub distance: f64,
    pub start_point: String,
    pub end_point: String,
    pub ride_date: DateTime<Utc>,
    pub route_map_link: Option<String>,
    pub participation_fee: Option<Decimal>,
    pub registration_limit: Option<i32>,
}
