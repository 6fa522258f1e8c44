use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ride_id: Option<Uuid>,
    pub amount: Decimal,
    pub currency: String,
    pub payment_gateway: String,
    pub payment_id: Option<String>,
    pub payment_type: String,
    pub status: String,
    pub invoice_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payment joined with payer and ride title for the supervisor overview.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PaymentDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ride_id: Option<Uuid>,
    pub amount: Decimal,
    pub currency: String,
    pub payment_gateway: String,
    pub payment_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub payer_name: String,
    pub payer_email: String,
    pub ride_title: Option<String>,
}
