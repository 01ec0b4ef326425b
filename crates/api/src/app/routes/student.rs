//! Student routes: catalog browsing and enrollment.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use courseforge_auth::Role;
use courseforge_core::CourseId;
use courseforge_store::StoreError;

use crate::app::dto::{self, EnrollRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;
use crate::middleware::{self, RoleGate};

pub fn router() -> Router {
    Router::new()
        .route("/courses", get(catalog))
        .route("/enroll", post(enroll))
        .route("/today-courses", get(today_courses))
        .route("/my-courses", get(my_courses))
        .layer(axum::middleware::from_fn_with_state(
            RoleGate::new(Role::Student),
            middleware::require_role,
        ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/student/courses - The approved catalog
pub async fn catalog(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Response, ApiError> {
    let rows = services.store().list_approved_courses().await?;
    Ok((StatusCode::OK, Json(rows)).into_response())
}

/// POST /api/student/enroll - Enroll in an approved course
///
/// Unapproved courses answer 404, same as absent ones; the catalog never
/// showed them. Enrolling twice is a conflict.
pub async fn enroll(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<EnrollRequest>,
) -> Result<Response, ApiError> {
    let Some(raw) = dto::required(&body.course_id) else {
        return Err(ApiError::validation("Course ID required"));
    };
    let course = raw.parse::<CourseId>()?;

    match services
        .store()
        .insert_enrollment(user.user_id(), course)
        .await
    {
        Ok(enrollment) => {
            tracing::info!(
                enrollment_id = %enrollment.id,
                student_id = %user.user_id(),
                course_id = %course,
                "enrolled"
            );
            Ok((
                StatusCode::CREATED,
                Json(json!({ "message": "Enrolled successfully" })),
            )
                .into_response())
        }
        Err(StoreError::MissingReference(_)) => Err(ApiError::not_found("Course not found")),
        Err(StoreError::Conflict(_)) => Err(ApiError::conflict("Already enrolled")),
        Err(other) => Err(other.into()),
    }
}

/// GET /api/student/today-courses - Enrollments made today
pub async fn today_courses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let rows = services
        .store()
        .list_today_enrollments(user.user_id())
        .await?;
    Ok((StatusCode::OK, Json(rows)).into_response())
}

/// GET /api/student/my-courses - Everything the caller is enrolled in
pub async fn my_courses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let rows = services
        .store()
        .list_student_enrollments(user.user_id())
        .await?;
    Ok((StatusCode::OK, Json(rows)).into_response())
}
