use axum::extract::Path;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::models::payment::{Payment, PaymentDetail};
use crate::db::pool;
use crate::error::ApiError;

const PAYMENT_STATUSES: &[&str] = &["pending", "completed", "failed", "refunded"];

/// GET /api/supervisor/payments - Every payment with payer and ride context
pub async fn list() -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let payments = sqlx::query_as::<_, PaymentDetail>(
        r#"
        SELECT pay.id, pay.user_id, pay.ride_id, pay.amount, pay.currency,
               pay.payment_gateway, pay.payment_type, pay.status, pay.created_at,
               p.full_name AS payer_name, p.email AS payer_email,
               r.title AS ride_title
        FROM payments pay
        JOIN profiles p ON p.id = pay.user_id
        LEFT JOIN rides r ON r.id = pay.ride_id
        ORDER BY pay.created_at DESC
        "#,
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": payments })))
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusChange {
    pub status: String,
}

/// PATCH /api/supervisor/payments/:id/status - Reconcile a payment. The new
/// status is mirrored onto the registration the payment belongs to.
pub async fn set_status(
    Path(payment_id): Path<Uuid>,
    Json(change): Json<PaymentStatusChange>,
) -> Result<Json<Value>, ApiError> {
    if !PAYMENT_STATUSES.contains(&change.status.as_str()) {
        return Err(ApiError::bad_request(format!(
            "Invalid status, expected one of: {}",
            PAYMENT_STATUSES.join(", ")
        )));
    }

    let pool = pool::pool().await?;
    let mut tx = pool.begin().await?;

    let payment = sqlx::query_as::<_, Payment>(
        "UPDATE payments SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(payment_id)
    .bind(&change.status)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| ApiError::not_found("Payment not found"))?;

    sqlx::query("UPDATE ride_registrations SET payment_status = $2 WHERE payment_id = $1")
        .bind(payment_id)
        .bind(&change.status)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!("Payment {} marked {}", payment_id, change.status);
    Ok(Json(json!({ "success": true, "data": payment })))
}
