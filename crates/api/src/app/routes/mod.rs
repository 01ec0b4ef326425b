use axum::{Json, Router, routing::get};
use serde_json::json;

pub mod admin;
pub mod auth;
pub mod instructor;
pub mod student;
pub mod users;

/// Router for all authenticated endpoints. Each role surface layers its own
/// role gate; `/api/users/me` only needs a valid token.
pub fn router() -> Router {
    Router::new()
        .route("/api/users/me", get(users::me))
        .nest("/api/admin", admin::router())
        .nest("/api/instructor", instructor::router())
        .nest("/api/student", student::router())
}

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
