//! Wire shapes the API serves, as the client reads them.
//!
//! Field names mirror the response bodies exactly; these only derive
//! `Deserialize` (plus `Serialize` for request payloads).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courseforge_auth::Role;
use courseforge_core::{CourseId, UserId};

/// Verified identity echoed by `/api/users/me`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub role: Role,
}

/// A catalog row: an approved course as students browse it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CourseListing {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: Option<String>,
    pub instructor: String,
}

/// A course the caller is enrolled in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnrolledCourse {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub instructor: String,
    pub enrolled_at: DateTime<Utc>,
}

/// Payload for creating a course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// One of the caller's own courses, with its enrollment count.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstructorCourse {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: Option<String>,
    pub approved: bool,
    pub students: i64,
}

/// A student on a course roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnrolledStudent {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub enrolled_at: DateTime<Utc>,
}

/// An instructor awaiting approval.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PendingInstructor {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// A course awaiting approval.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PendingCourse {
    pub id: CourseId,
    pub title: String,
    pub price: f64,
    pub instructor: String,
}

/// Any course on the admin overview.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdminCourse {
    pub id: CourseId,
    pub title: String,
    pub price: f64,
    pub approved: bool,
    pub instructor: String,
    pub students: i64,
}

/// An account as the admin surface lists them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub approved: bool,
}
