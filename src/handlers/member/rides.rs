use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::models::badge::EarnedBadge;
use crate::db::pool;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::registration;

/// POST /api/rides/:id/register - Sign the caller up for a ride
pub async fn register(
    Extension(user): Extension<AuthUser>,
    Path(ride_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let pool = pool::pool().await?;
    let reg = registration::register_for_ride(&pool, ride_id, user.user_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": reg })),
    ))
}

/// GET /api/rides/history - The caller's registrations with ride context
pub async fn history(Extension(user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let rows: Vec<(Value,)> = sqlx::query_as(
        r#"
        SELECT jsonb_build_object(
            'registration_id', reg.id,
            'payment_status', reg.payment_status,
            'registered_at', reg.registered_at,
            'ride', to_jsonb(r)
        )
        FROM ride_registrations reg
        JOIN rides r ON r.id = reg.ride_id
        WHERE reg.user_id = $1
        ORDER BY r.ride_date DESC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&pool)
    .await?;

    let history: Vec<Value> = rows.into_iter().map(|(v,)| v).collect();

    Ok(Json(json!({ "success": true, "data": history })))
}

/// GET /api/badges/mine - Badges the caller has earned
pub async fn my_badges(Extension(user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let badges = sqlx::query_as::<_, EarnedBadge>(
        r#"
        SELECT b.id AS badge_id, b.name, b.description, b.icon_url,
               ub.earned_at, ub.is_manual
        FROM user_badges ub
        JOIN badges b ON b.id = ub.badge_id
        WHERE ub.user_id = $1
        ORDER BY ub.earned_at DESC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": badges })))
}
