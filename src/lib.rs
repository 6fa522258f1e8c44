pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod storage;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post, put};
use axum::{middleware as axum_middleware, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::auth::bearer_auth_middleware;
use crate::middleware::require::{require_admin, require_member, require_supervisor};

/// Assemble the full application router. The bearer layer is outermost so
/// caller identity is extracted before any per-tree guard runs.
pub fn app() -> Router {
    let config = config::config();

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_auth_routes())
        .merge(public_content_routes())
        .merge(member_routes())
        .nest(
            "/api/admin",
            managed_content_routes().route_layer(axum_middleware::from_fn(require_admin)),
        )
        .nest(
            "/api/supervisor",
            managed_content_routes()
                .merge(supervisor_routes())
                .route_layer(axum_middleware::from_fn(require_supervisor)),
        )
        .nest_service(
            &config.storage.public_prefix,
            ServeDir::new(&config.storage.upload_dir),
        )
        .layer(axum_middleware::from_fn(bearer_auth_middleware))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
}

fn public_auth_routes() -> Router {
    use handlers::public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/supervisor/login", post(auth::supervisor_login))
}

fn public_content_routes() -> Router {
    use handlers::public::content;

    Router::new()
        .route("/api/rides", get(content::list_rides))
        .route("/api/rides/:id", get(content::get_ride))
        .route("/api/leaderboard", get(content::leaderboard))
        .route("/api/content/hero", get(content::hero_images))
        .route("/api/content/announcements", get(content::announcements))
        .route("/api/content/team", get(content::team))
        .route("/api/gallery/albums", get(content::gallery_albums))
        .route("/api/gallery/albums/:id/photos", get(content::gallery_photos))
}

fn member_routes() -> Router {
    use handlers::member::{profile, rides, session};

    Router::new()
        .route("/api/auth/session", get(session::session))
        .route("/api/dashboard", get(session::dashboard))
        .route("/api/profile", get(profile::get_profile).put(profile::update_profile))
        .route("/api/profile/photo", post(profile::upload_photo))
        .route("/api/rides/history", get(rides::history))
        .route("/api/rides/:id/register", post(rides::register))
        .route("/api/badges/mine", get(rides::my_badges))
        .route_layer(axum_middleware::from_fn(require_member))
}

/// Management surface shared by the admin console and the supervisor panel.
/// Mounted twice, each time behind its own guard; the guards do not compose,
/// so an admin token opens only the /api/admin mount and a supervisor token
/// only the /api/supervisor one.
fn managed_content_routes() -> Router {
    use handlers::admin::{announcements, badges, gallery, hero, registrations, rides};

    Router::new()
        .route("/rides", get(rides::list).post(rides::create))
        .route("/rides/:id", put(rides::update).delete(rides::delete))
        .route("/rides/:id/status", patch(rides::set_status))
        .route("/rides/:id/registrations", get(registrations::list_for_ride))
        .route("/registrations", get(registrations::list_all))
        .route("/registrations/:id", delete(registrations::remove))
        .route("/badges", get(badges::list).post(badges::create))
        .route("/badges/:id", delete(badges::delete))
        .route("/badges/:id/award", post(badges::award))
        .route("/announcements", get(announcements::list).post(announcements::create))
        .route("/announcements/:id", delete(announcements::delete))
        .route("/announcements/:id/active", patch(announcements::toggle_active))
        .route("/hero", get(hero::list).post(hero::upload))
        .route("/hero/order", put(hero::reorder))
        .route("/hero/:id", delete(hero::delete))
        .route("/hero/:id/active", patch(hero::toggle_active))
        .route("/gallery/albums", post(gallery::create_album))
        .route("/gallery/albums/:id", delete(gallery::delete_album))
        .route("/gallery/albums/:id/photos", post(gallery::upload_photo))
        .route("/gallery/photos/:id", delete(gallery::delete_photo))
}

fn supervisor_routes() -> Router {
    use handlers::supervisor::{broadcast, overview, payments, team, users};

    Router::new()
        .route("/overview", get(overview::overview))
        .route("/payments", get(payments::list))
        .route("/payments/:id/status", patch(payments::set_status))
        .route("/users", get(users::list))
        .route("/users/:id", put(users::update).delete(users::delete))
        .route("/users/:id/suspend", patch(users::toggle_suspend))
        .route("/notifications", post(broadcast::send))
        .route("/team", get(team::list).post(team::create))
        .route("/team/order", put(team::reorder))
        .route("/team/:id", put(team::update).delete(team::delete))
        .route("/team/:id/active", patch(team::toggle_active))
}

fn cors_layer() -> CorsLayer {
    if config::config().security.enable_cors {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    }
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Taj Royals API",
            "version": version,
            "description": "Membership and event-management API for the Taj Royals motorcycle club",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/register, /auth/login, /auth/supervisor/login (public)",
                "content": "/api/content/*, /api/gallery/*, /api/rides, /api/leaderboard (public)",
                "member": "/api/auth/session, /api/dashboard, /api/profile, /api/rides/*, /api/badges/mine (member token)",
                "admin": "/api/admin/* (admin or super_admin member token)",
                "supervisor": "/api/supervisor/* (supervisor token)",
                "uploads": "/uploads/* (public, static)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match db::pool::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
