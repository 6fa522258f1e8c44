use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::registration::RideRegistration;
use crate::db::models::ride::Ride;
use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("ride not found")]
    RideNotFound,

    #[error("ride is not open for registration (status: {0})")]
    NotOpen(String),

    #[error("no spots left on this ride")]
    NoSpotsLeft,

    #[error("already registered for this ride")]
    AlreadyRegistered,

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::RideNotFound => ApiError::not_found("Ride not found"),
            RegistrationError::NotOpen(status) => {
                ApiError::conflict(format!("Ride is not open for registration ({})", status))
            }
            RegistrationError::NoSpotsLeft => ApiError::conflict("No spots left on this ride"),
            RegistrationError::AlreadyRegistered => {
                ApiError::conflict("Already registered for this ride")
            }
            RegistrationError::Db(e) => e.into(),
        }
    }
}

/// Sign a member up for a ride. The ride row is locked for the duration so
/// the spot decrement and the registration insert move together; two racing
/// signups for the last spot cannot both succeed.
pub async fn register_for_ride(
    pool: &PgPool,
    ride_id: Uuid,
    user_id: Uuid,
) -> Result<RideRegistration, RegistrationError> {
    let mut tx = pool.begin().await?;

    let ride = sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = $1 FOR UPDATE")
        .bind(ride_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RegistrationError::RideNotFound)?;

    let (already,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM ride_registrations WHERE ride_id = $1 AND user_id = $2)",
    )
    .bind(ride_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    check_eligibility(&ride.status, ride.spots_available, already)?;

    if ride.spots_available.is_some() {
        sqlx::query("UPDATE rides SET spots_available = spots_available - 1, updated_at = now() WHERE id = $1")
            .bind(ride_id)
            .execute(&mut *tx)
            .await?;
    }

    // Fee-bearing rides get a pending payment record; there is no gateway
    // integration, collection is reconciled on the supervisor panel.
    let payment_id = match ride.participation_fee {
        Some(fee) if fee > Decimal::ZERO => {
            let (id,): (Uuid,) = sqlx::query_as(
                r#"
                INSERT INTO payments (user_id, ride_id, amount, payment_gateway, payment_type, status)
                VALUES ($1, $2, $3, 'manual', 'ride_fee', 'pending')
                RETURNING id
                "#,
            )
            .bind(user_id)
            .bind(ride_id)
            .bind(fee)
            .fetch_one(&mut *tx)
            .await?;
            Some(id)
        }
        _ => None,
    };

    let payment_status = payment_id.map(|_| "pending".to_string());

    let registration = sqlx::query_as::<_, RideRegistration>(
        r#"
        INSERT INTO ride_registrations (ride_id, user_id, payment_id, payment_status)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(ride_id)
    .bind(user_id)
    .bind(payment_id)
    .bind(payment_status)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!("User {} registered for ride {}", user_id, ride_id);
    Ok(registration)
}

fn check_eligibility(
    status: &str,
    spots_available: Option<i32>,
    already_registered: bool,
) -> Result<(), RegistrationError> {
    if already_registered {
        return Err(RegistrationError::AlreadyRegistered);
    }
    if status != "Open" {
        return Err(RegistrationError::NotOpen(status.to_string()));
    }
    if let Some(spots) = spots_available {
        if spots <= 0 {
            return Err(RegistrationError::NoSpotsLeft);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_ride_with_spots_is_eligible() {
        assert!(check_eligibility("Open", Some(3), false).is_ok());
        assert!(check_eligibility("Open", None, false).is_ok());
    }

    #[test]
    fn duplicate_registration_wins_over_other_checks() {
        assert!(matches!(
            check_eligibility("Closed", Some(0), true),
            Err(RegistrationError::AlreadyRegistered)
        ));
    }

    #[test]
    fn closed_and_full_rides_are_rejected() {
        assert!(matches!(
            check_eligibility("Completed", Some(5), false),
            Err(RegistrationError::NotOpen(_))
        ));
        assert!(matches!(
            check_eligibility("Open", Some(0), false),
            Err(RegistrationError::NoSpotsLeft)
        ));
    }
}
