use axum::response::Json;
use axum::Extension;
use serde_json::{json, Value};

use crate::db::models::announcement::Announcement;
use crate::db::models::badge::EarnedBadge;
use crate::db::models::profile::Profile;
use crate::db::models::ride::Ride;
use crate::db::pool;
use crate::error::ApiError;
use crate::handlers::{resolve_role, session_payload};
use crate::middleware::AuthUser;

/// GET /api/auth/session - Current identity with fresh role flags.
///
/// The role is re-read from the roles table on every call rather than
/// trusted from the token, so a grant or revocation takes effect on the
/// next session fetch instead of at token expiry.
pub async fn session(Extension(user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    if profile.is_suspended {
        return Err(ApiError::forbidden("Account is suspended"));
    }

    let role = resolve_role(&pool, profile.id).await;

    Ok(Json(json!({
        "success": true,
        "data": session_payload(&profile, role),
    })))
}

/// GET /api/dashboard - Member home: profile stats, upcoming registered
/// rides, earned badges, and any popup announcement.
pub async fn dashboard(Extension(user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let pool = pool::pool().await?;

    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(user.user_id)
        .fetch_optional(&pool)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    let upcoming = sqlx::query_as::<_, Ride>(
        r#"
        SELECT r.* FROM rides r
        JOIN ride_registrations reg ON reg.ride_id = r.id
        WHERE reg.user_id = $1 AND r.ride_date >= now() AND r.status <> 'Cancelled'
        ORDER BY r.ride_date
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&pool)
    .await?;

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

    let popup = sqlx::query_as::<_, Announcement>(
        r#"
        SELECT * FROM announcements
        WHERE is_active = TRUE AND show_as_popup = TRUE
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(&pool)
    .await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "profile": profile,
            "upcoming_rides": upcoming,
            "badges": badges,
            "popup_announcement": popup,
        }
    })))
}
