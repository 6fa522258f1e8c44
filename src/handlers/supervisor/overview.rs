use axum::response::Json;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::db::models::registration::RegistrationDetail;
use crate::db::pool;
use crate::error::ApiError;

/// GET /api/supervisor/overview - Club-wide counters plus the latest
/// sign-up activity for the panel's landing view.
pub async fn overview() -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let (members,): (i64,) = sqlx::query_as("SELECT count(*) FROM profiles")
        .fetch_one(&pool)
        .await?;
    let (suspended,): (i64,) =
        sqlx::query_as("SELECT count(*) FROM profiles WHERE is_suspended = TRUE")
            .fetch_one(&pool)
            .await?;
    let (rides,): (i64,) = sqlx::query_as("SELECT count(*) FROM rides")
        .fetch_one(&pool)
        .await?;
    let (open_rides,): (i64,) =
        sqlx::query_as("SELECT count(*) FROM rides WHERE status = 'Open'")
            .fetch_one(&pool)
            .await?;
    let (pending_payments,): (i64,) =
        sqlx::query_as("SELECT count(*) FROM payments WHERE status = 'pending'")
            .fetch_one(&pool)
            .await?;
    let (collected,): (Option<Decimal>,) =
        sqlx::query_as("SELECT sum(amount) FROM payments WHERE status = 'completed'")
            .fetch_one(&pool)
            .await?;

    let recent = sqlx::query_as::<_, RegistrationDetail>(
        r#"
        SELECT reg.id, reg.ride_id, reg.user_id, reg.payment_status, reg.registered_at,
               p.full_name AS rider_name, p.email AS rider_email, p.mobile AS rider_mobile,
               r.title AS ride_title, r.ride_date
        FROM ride_registrations reg
        JOIN profiles p ON p.id = reg.user_id
        JOIN rides r ON r.id = reg.ride_id
        ORDER BY reg.registered_at DESC
        LIMIT 10
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "members": members,
            "suspended_members": suspended,
            "rides": rides,
            "open_rides": open_rides,
            "pending_payments": pending_payments,
            "collected_amount": collected.unwrap_or(Decimal::ZERO),
            "recent_registrations": recent,
        }
    })))
}
