use axum::extract::Path;
use axum::response::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::models::registration::RegistrationDetail;
use crate::db::pool;
use crate::error::ApiError;

const DETAIL_QUERY: &str = r#"
    SELECT reg.id, reg.ride_id, reg.user_id, reg.payment_status, reg.registered_at,
           p.full_name AS rider_name, p.email AS rider_email, p.mobile AS rider_mobile,
           r.title AS ride_title, r.ride_date
    FROM ride_registrations reg
    JOIN profiles p ON p.id = reg.user_id
    JOIN rides r ON r.id = reg.ride_id
"#;

/// GET /registrations - Every registration with rider and ride context,
/// newest first
pub async fn list_all() -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let rows = sqlx::query_as::<_, RegistrationDetail>(&format!(
        "{} ORDER BY reg.registered_at DESC",
        DETAIL_QUERY
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": rows })))
}

/// GET /rides/:id/registrations - Sign-ups for one ride
pub async fn list_for_ride(Path(ride_id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let (ride_exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM rides WHERE id = $1)")
            .bind(ride_id)
            .fetch_one(&pool)
            .await?;
    if !ride_exists {
        return Err(ApiError::not_found("Ride not found"));
    }

    let rows = sqlx::query_as::<_, RegistrationDetail>(&format!(
        "{} WHERE reg.ride_id = $1 ORDER BY reg.registered_at",
        DETAIL_QUERY
    ))
    .bind(ride_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": rows })))
}

/// DELETE /registrations/:id - Drop a registration and release its spot
pub async fn remove(Path(registration_id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;
    let mut tx = pool.begin().await?;

    let ride_id: Option<Uuid> = sqlx::query_scalar(
        "DELETE FROM ride_registrations WHERE id = $1 RETURNING ride_id",
    )
    .bind(registration_id)
    .fetch_optional(&mut *tx)
    .await?;

    let ride_id = ride_id.ok_or_else(|| ApiError::not_found("Registration not found"))?;

    sqlx::query(
        r#"
        UPDATE rides SET spots_available = spots_available + 1, updated_at = now()
        WHERE id = $1 AND spots_available IS NOT NULL
        "#,
    )
    .bind(ride_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("Registration {} removed from ride {}", registration_id, ride_id);
    Ok(Json(json!({ "success": true, "data": { "deleted": registration_id } })))
}
