//! Routes any authenticated caller can reach.

use axum::{Json, extract::Extension};
use serde_json::json;

use crate::context::CurrentUser;

/// GET /api/users/me - Echo the verified identity
///
/// Answers from the token claims alone; no store round-trip.
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<serde_json::Value> {
    Json(json!({
        "message": "User profile",
        "user": {
            "id": user.user_id(),
            "role": user.role(),
        },
    }))
}
