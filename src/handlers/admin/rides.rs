use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::TokenScope;
use crate::db::models::ride::{NewRide, Ride, RIDE_STATUSES};
use crate::db::pool;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// GET /rides - Every ride for the management table, newest first
pub async fn list() -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let rides = sqlx::query_as::<_, Ride>("SELECT * FROM rides ORDER BY created_at DESC")
        .fetch_all(&pool)
        .await?;

    Ok(Json(json!({ "success": true, "data": rides })))
}

/// POST /rides - Create a ride. A registration limit seeds the available
/// spot counter; unlimited rides leave both NULL.
pub async fn create(
    Extension(user): Extension<AuthUser>,
    Json(ride): Json<NewRide>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate_ride(&ride)?;
    let pool = pool::pool().await?;

    // Supervisor tokens carry no member identity; leave created_by empty.
    let created_by = match user.scope {
        TokenScope::Member => Some(user.user_id),
        TokenScope::Supervisor => None,
    };

    let created = sqlx::query_as::<_, Ride>(
        r#"
        INSERT INTO rides (title, description, ride_type, difficulty, distance,
                           start_point, end_point, ride_date, route_map_link,
                           participation_fee, registration_limit, spots_available, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11, $12)
        RETURNING *
        "#,
    )
    .bind(&ride.title)
    .bind(&ride.description)
    .bind(&ride.ride_type)
    .bind(&ride.difficulty)
    .bind(ride.distance)
    .bind(&ride.start_point)
    .bind(&ride.end_point)
    .bind(ride.ride_date)
    .bind(&ride.route_map_link)
    .bind(ride.participation_fee)
    .bind(ride.registration_limit)
    .bind(created_by)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Ride created: {} ({})", created.title, created.id);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": created })),
    ))
}

/// PUT /rides/:id - Rewrite a ride's details. Status and the live spot
/// counter are managed by the status endpoint, not here.
pub async fn update(
    Path(ride_id): Path<Uuid>,
    Json(ride): Json<NewRide>,
) -> Result<Json<Value>, ApiError> {
    validate_ride(&ride)?;
    let pool = pool::pool().await?;

    let updated = sqlx::query_as::<_, Ride>(
        r#"
        UPDATE rides SET
            title = $2, description = $3, ride_type = $4, difficulty = $5,
            distance = $6, start_point = $7, end_point = $8, ride_date = $9,
            route_map_link = $10, participation_fee = $11, registration_limit = $12,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(ride_id)
    .bind(&ride.title)
    .bind(&ride.description)
    .bind(&ride.ride_type)
    .bind(&ride.difficulty)
    .bind(ride.distance)
    .bind(&ride.start_point)
    .bind(&ride.end_point)
    .bind(ride.ride_date)
    .bind(&ride.route_map_link)
    .bind(ride.participation_fee)
    .bind(ride.registration_limit)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::not_found("Ride not found"))?;

    Ok(Json(json!({ "success": true, "data": updated })))
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: String,
}

/// PATCH /rides/:id/status - Move a ride through its lifecycle. Completing
/// a ride credits every registered rider's totals and runs badge criteria.
pub async fn set_status(
    Path(ride_id): Path<Uuid>,
    Json(change): Json<StatusChange>,
) -> Result<Json<Value>, ApiError> {
    if !RIDE_STATUSES.contains(&change.status.as_str()) {
        return Err(ApiError::bad_request(format!(
            "Invalid status, expected one of: {}",
            RIDE_STATUSES.join(", ")
        )));
    }

    let pool = pool::pool().await?;
    let mut tx = pool.begin().await?;

    let ride = sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = $1 FOR UPDATE")
        .bind(ride_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Ride not found"))?;

    let updated = sqlx::query_as::<_, Ride>(
        r#"
        UPDATE rides SET
            status = $2,
            completed_at = CASE
                WHEN $2 = 'Completed' THEN COALESCE(completed_at, now())
                ELSE completed_at
            END,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(ride_id)
    .bind(&change.status)
    .fetch_one(&mut *tx)
    .await?;

    if should_credit(&change.status, ride.completed_at) {
        credit_completion(&mut tx, &ride).await?;
    }

    tx.commit().await?;

    tracing::info!("Ride {} status: {} -> {}", ride_id, ride.status, change.status);
    Ok(Json(json!({ "success": true, "data": updated })))
}

/// DELETE /rides/:id - Remove a ride and (by cascade) its registrations
pub async fn delete(Path(ride_id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let result = sqlx::query("DELETE FROM rides WHERE id = $1")
        .bind(ride_id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Ride not found"));
    }

    Ok(Json(json!({ "success": true, "data": { "deleted": ride_id } })))
}

/// Totals are credited the first time a ride reaches Completed. A ride that
/// is reopened and completed again keeps its original completion mark and
/// must not credit twice.
fn should_credit(new_status: &str, completed_at: Option<DateTime<Utc>>) -> bool {
    new_status == "Completed" && completed_at.is_none()
}

/// Credit distance and ride counts to everyone registered on a completed
/// ride, then award any milestone badges the new totals satisfy.
async fn credit_completion(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ride: &Ride,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE profiles SET
            total_km_ridden = total_km_ridden + $2,
            total_rides_completed = total_rides_completed + 1,
            updated_at = now()
        WHERE id IN (SELECT user_id FROM ride_registrations WHERE ride_id = $1)
        "#,
    )
    .bind(ride.id)
    .bind(ride.distance)
    .execute(&mut **tx)
    .await?;

    // Milestone badges: rides_completed and km_ridden thresholds. Manual
    // badges have no criteria_value and never match here.
    sqlx::query(
        r#"
        INSERT INTO user_badges (user_id, badge_id, is_manual)
        SELECT p.id, b.id, FALSE
        FROM profiles p
        CROSS JOIN badges b
        WHERE p.id IN (SELECT user_id FROM ride_registrations WHERE ride_id = $1)
          AND b.criteria_value IS NOT NULL
          AND (
                (b.criteria_type = 'rides_completed' AND p.total_rides_completed >= b.criteria_value)
             OR (b.criteria_type = 'km_ridden' AND p.total_km_ridden >= b.criteria_value)
          )
        ON CONFLICT (user_id, badge_id) DO NOTHING
        "#,
    )
    .bind(ride.id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

fn validate_ride(ride: &NewRide) -> Result<(), ApiError> {
    if ride.title.trim().is_empty() {
        return Err(ApiError::bad_request("Ride title is required"));
    }
    if ride.distance <= 0.0 {
        return Err(ApiError::bad_request("Distance must be positive"));
    }
    if let Some(limit) = ride.registration_limit {
        if limit <= 0 {
            return Err(ApiError::bad_request("Registration limit must be positive"));
        }
    }
    if let Some(fee) = ride.participation_fee {
        if fee.is_sign_negative() {
            return Err(ApiError::bad_request("Participation fee cannot be negative"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn ride(title: &str, distance: f64) -> NewRide {
        NewRide {
            title: title.to_string(),
            description: None,
            ride_type: "Highway".to_string(),
            difficulty: "Medium".to_string(),
            distance,
            start_point: "Clubhouse".to_string(),
            end_point: "Hill View".to_string(),
            ride_date: Utc::now(),
            route_map_link: None,
            participation_fee: None,
            registration_limit: None,
        }
    }

    #[test]
    fn completion_credits_totals_only_once() {
        assert!(should_credit("Completed", None));
        assert!(!should_credit("Completed", Some(Utc::now())));
        assert!(!should_credit("Closed", None));
        assert!(!should_credit("Cancelled", Some(Utc::now())));
    }

    #[test]
    fn validates_basic_ride_fields() {
        assert!(validate_ride(&ride("Sunday Loop", 120.0)).is_ok());
        assert!(validate_ride(&ride(" ", 120.0)).is_err());
        assert!(validate_ride(&ride("Sunday Loop", 0.0)).is_err());

        let mut limited = ride("Sunday Loop", 120.0);
        limited.registration_limit = Some(0);
        assert!(validate_ride(&limited).is_err());

        let mut negative_fee = ride("Sunday Loop", 120.0);
        negative_fee.participation_fee = Some(Decimal::new(-100, 0));
        assert!(validate_ride(&negative_fee).is_err());
    }
}
