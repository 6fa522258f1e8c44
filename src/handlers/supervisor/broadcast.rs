use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::models::announcement::Announcement;
use crate::db::pool;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub title: String,
    pub message: String,
}

/// POST /api/supervisor/notifications - Push a club-wide notice. Broadcasts
/// are announcements forced onto the dashboard popup so every member sees
/// them on their next visit.
pub async fn send(
    Json(req): Json<BroadcastRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if req.title.trim().is_empty() || req.message.trim().is_empty() {
        return Err(ApiError::bad_request("Title and message are required"));
    }

    let pool = pool::pool().await?;
    let announcement = sqlx::query_as::<_, Announcement>(
        r#"
        INSERT INTO announcements (title, description, show_as_popup)
        VALUES ($1, $2, TRUE)
        RETURNING *
        "#,
    )
    .bind(&req.title)
    .bind(&req.message)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Broadcast sent: {}", announcement.title);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": announcement })),
    ))
}
