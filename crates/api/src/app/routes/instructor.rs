//! Instructor routes: course authoring and rosters.
//!
//! Course-scoped endpoints check ownership through the store; a course the
//! caller does not own is indistinguishable from one that does not exist.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::json;

use courseforge_auth::Role;
use courseforge_core::{CourseId, UserId};
use courseforge_store::NewCourse;

use crate::app::dto::{self, CreateCourseRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;
use crate::middleware::{self, RoleGate};

pub fn router() -> Router {
    Router::new()
        .route("/create-course", post(create_course))
        .route("/my-courses", get(my_courses))
        .route("/course/:id/students", get(course_students))
        .route("/course/:id", delete(delete_course))
        .layer(axum::middleware::from_fn_with_state(
            RoleGate::new(Role::Instructor),
            middleware::require_role,
        ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/instructor/create-course - Author a course
///
/// New courses are invisible to students until an admin approves them.
pub async fn create_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<CreateCourseRequest>,
) -> Result<Response, ApiError> {
    let (Some(title), Some(description), Some(price)) = (
        dto::required(&body.title),
        dto::required(&body.description),
        body.price,
    ) else {
        return Err(ApiError::validation("Missing required fields"));
    };

    if !price.is_finite() || price < 0.0 {
        return Err(ApiError::validation("Price must be a non-negative number"));
    }

    let course = NewCourse {
        title: title.to_string(),
        description: description.to_string(),
        price,
        category: dto::required(&body.category).map(str::to_string),
        instructor_id: user.user_id(),
    };

    let created = services.store().insert_course(course).await?;
    tracing::info!(course_id = %created.id, instructor_id = %user.user_id(), "course created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Course created successfully",
            "courseId": created.id,
        })),
    )
        .into_response())
}

/// GET /api/instructor/my-courses - The caller's courses with headcounts
pub async fn my_courses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response, ApiError> {
    let rows = services
        .store()
        .list_instructor_courses(user.user_id())
        .await?;
    Ok((StatusCode::OK, Json(rows)).into_response())
}

/// GET /api/instructor/course/:id/students - Roster of one owned course
pub async fn course_students(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = id.parse::<CourseId>()?;
    check_ownership(&services, id, user.user_id()).await?;

    let rows = services.store().list_course_students(id).await?;
    Ok((StatusCode::OK, Json(rows)).into_response())
}

/// DELETE /api/instructor/course/:id - Withdraw an owned course
///
/// Enrollments go with the course, atomically.
pub async fn delete_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = id.parse::<CourseId>()?;
    check_ownership(&services, id, user.user_id()).await?;

    services.store().delete_course(id).await?;
    tracing::info!(course_id = %id, instructor_id = %user.user_id(), "course deleted");

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Course deleted successfully" })),
    )
        .into_response())
}

/// Missing course and foreign course answer the same 403.
async fn check_ownership(
    services: &AppServices,
    course: CourseId,
    caller: UserId,
) -> Result<(), ApiError> {
    match services.store().course_owner(course).await? {
        Some(owner) if owner == caller => Ok(()),
        _ => Err(ApiError::forbidden("Unauthorized")),
    }
}
