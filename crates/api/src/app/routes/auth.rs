//! Public authentication routes: registration and login.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;

use courseforge_auth::{Role, hash_password, verify_password};
use courseforge_store::{NewUser, StoreError};

use crate::app::dto::{self, LoginRequest, RegisterRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/auth/register - Create an account
///
/// Students are usable immediately; instructors wait for admin approval.
/// Admin accounts only come from the `create-admin` bin.
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let (Some(name), Some(email), Some(password)) = (
        dto::required(&body.name),
        dto::required(&body.email),
        dto::required(&body.password),
    ) else {
        return Err(ApiError::validation("All fields are required"));
    };

    let role = match dto::required(&body.role) {
        Some(raw) => raw.parse::<Role>()?,
        None => Role::Student,
    };
    if role == Role::Admin {
        return Err(ApiError::forbidden("Admin registration is not allowed"));
    }

    let user = NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password_hash: hash_password(password)?,
        role,
        approved: role.approved_on_registration(),
    };

    match services.store().insert_user(user).await {
        Ok(created) => {
            tracing::info!(user_id = %created.id, role = %created.role, "user registered");
            Ok((
                StatusCode::CREATED,
                Json(json!({ "message": "User registered successfully" })),
            )
                .into_response())
        }
        Err(StoreError::Conflict(_)) => Err(ApiError::conflict("Email already exists")),
        Err(other) => Err(other.into()),
    }
}

/// POST /api/auth/login - Exchange credentials for a bearer token
///
/// Unknown email and wrong password answer identically so the response does
/// not reveal which accounts exist.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password)) = (dto::required(&body.email), dto::required(&body.password))
    else {
        return Err(ApiError::validation("All fields required"));
    };

    let user = services
        .store()
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| ApiError::auth("Invalid email or password"))?;

    if !verify_password(password, &user.password_hash)? {
        return Err(ApiError::auth("Invalid email or password"));
    }

    if user.role == Role::Instructor && !user.approved {
        return Err(ApiError::forbidden("Instructor not approved yet"));
    }

    let token = services.tokens().issue(user.id, user.role)?;
    tracing::info!(user_id = %user.id, role = %user.role, "login");

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Login successful",
            "token": token,
            "user": {
                "id": user.id,
                "name": user.name,
                "role": user.role,
            },
        })),
    )
        .into_response())
}
