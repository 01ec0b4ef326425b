//! Admin routes: instructor approval, course moderation, user management.
//!
//! Every endpoint sits behind the admin role gate. Approve/reject endpoints
//! answer 404 when the id matches nothing, and approving twice is harmless.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
};
use serde_json::json;

use courseforge_auth::Role;
use courseforge_core::{CourseId, UserId};
use courseforge_store::StoreError;

use crate::app::dto::{self, UpdateUserRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::middleware::{self, RoleGate};

pub fn router() -> Router {
    Router::new()
        .route("/pending-instructors", get(pending_instructors))
        .route("/approve/:id", put(approve_instructor))
        .route("/reject/:id", delete(reject_instructor))
        .route("/pending-courses", get(pending_courses))
        .route("/approve-course/:id", put(approve_course))
        .route("/reject-course/:id", delete(reject_course))
        .route("/courses", get(all_courses))
        .route("/users", get(all_users))
        .route("/user/:id", put(update_user).delete(delete_user))
        .layer(axum::middleware::from_fn_with_state(
            RoleGate::new(Role::Admin),
            middleware::require_role,
        ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Instructor approval
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/admin/pending-instructors - Instructors awaiting approval
pub async fn pending_instructors(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Response, ApiError> {
    let rows = services.store().list_pending_instructors().await?;
    Ok((StatusCode::OK, Json(rows)).into_response())
}

/// PUT /api/admin/approve/:id - Approve an instructor
pub async fn approve_instructor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = id.parse::<UserId>()?;

    if !services.store().approve_instructor(id).await? {
        return Err(ApiError::not_found("Instructor not found"));
    }
    tracing::info!(instructor_id = %id, "instructor approved");

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Instructor approved" })),
    )
        .into_response())
}

/// DELETE /api/admin/reject/:id - Reject an instructor
///
/// Removes the account and everything hanging off it in one transaction.
pub async fn reject_instructor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = id.parse::<UserId>()?;

    if !services.store().reject_instructor(id).await? {
        return Err(ApiError::not_found("Instructor not found"));
    }
    tracing::info!(instructor_id = %id, "instructor rejected");

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Instructor rejected" })),
    )
        .into_response())
}

// ─────────────────────────────────────────────────────────────────────────────
// Course moderation
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/admin/pending-courses - Courses awaiting approval
pub async fn pending_courses(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Response, ApiError> {
    let rows = services.store().list_pending_courses().await?;
    Ok((StatusCode::OK, Json(rows)).into_response())
}

/// PUT /api/admin/approve-course/:id - Publish a course to the catalog
pub async fn approve_course(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = id.parse::<CourseId>()?;

    if !services.store().approve_course(id).await? {
        return Err(ApiError::not_found("Course not found"));
    }
    tracing::info!(course_id = %id, "course approved");

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Course approved" })),
    )
        .into_response())
}

/// DELETE /api/admin/reject-course/:id - Remove a course
///
/// The course and its enrollments go together, atomically.
pub async fn reject_course(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = id.parse::<CourseId>()?;

    if !services.store().delete_course(id).await? {
        return Err(ApiError::not_found("Course not found"));
    }
    tracing::info!(course_id = %id, "course rejected");

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Course rejected" })),
    )
        .into_response())
}

/// GET /api/admin/courses - Every course, approval state and headcount included
pub async fn all_courses(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Response, ApiError> {
    let rows = services.store().list_all_courses().await?;
    Ok((StatusCode::OK, Json(rows)).into_response())
}

// ─────────────────────────────────────────────────────────────────────────────
// User management
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/admin/users - Every account, password material omitted
pub async fn all_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Response, ApiError> {
    let rows = services.store().list_users().await?;
    Ok((StatusCode::OK, Json(rows)).into_response())
}

/// PUT /api/admin/user/:id - Rename or re-address an account
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Response, ApiError> {
    let id = id.parse::<UserId>()?;

    let (Some(name), Some(email)) = (dto::required(&body.name), dto::required(&body.email)) else {
        return Err(ApiError::validation("Name and email are required"));
    };

    match services.store().update_user(id, name, email).await {
        Ok(true) => Ok((
            StatusCode::OK,
            Json(json!({ "message": "User updated successfully" })),
        )
            .into_response()),
        Ok(false) => Err(ApiError::not_found("User not found")),
        Err(StoreError::Conflict(_)) => Err(ApiError::conflict("Email already exists")),
        Err(other) => Err(other.into()),
    }
}

/// DELETE /api/admin/user/:id - Remove an account
///
/// Cascades: the user's enrollments, enrollments into their courses, and the
/// courses themselves disappear with the account.
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = id.parse::<UserId>()?;

    if !services.store().delete_user(id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    tracing::info!(user_id = %id, "user deleted");

    Ok((StatusCode::OK, Json(json!({ "message": "User deleted" }))).into_response())
}
