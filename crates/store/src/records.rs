//! Stored records and the read models the API serves.
//!
//! Records mirror table rows one to one. Read models are the join shapes the
//! HTTP layer returns verbatim, so they derive `Serialize` with the exact
//! field names the clients see. `UserRecord` deliberately does not derive
//! `Serialize`: the password hash must never reach a response body.

use chrono::{DateTime, Utc};
use serde::Serialize;

use courseforge_auth::Role;
use courseforge_core::{CourseId, EnrollmentId, UserId};

/// A user row (any role).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user. The caller decides `approved` (students start
/// approved, instructors start pending, bootstrapped admins start approved).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub approved: bool,
}

/// A course row.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseRecord {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: Option<String>,
    pub instructor_id: UserId,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a course. Courses always start unapproved.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: Option<String>,
    pub instructor_id: UserId,
}

/// An enrollment row: one student into one course, at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentRecord {
    pub id: EnrollmentId,
    pub student_id: UserId,
    pub course_id: CourseId,
    pub created_at: DateTime<Utc>,
}

/// A user as the admin surface lists them. No password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub approved: bool,
}

/// An instructor awaiting approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingInstructor {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// A catalog row: an approved course as students browse it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseListing {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: Option<String>,
    pub instructor: String,
}

/// A course awaiting approval, as the admin review queue lists it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingCourse {
    pub id: CourseId,
    pub title: String,
    pub price: f64,
    pub instructor: String,
}

/// Any course with approval state and enrollment count (admin overview).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminCourse {
    pub id: CourseId,
    pub title: String,
    pub price: f64,
    pub approved: bool,
    pub instructor: String,
    pub students: i64,
}

/// One of an instructor's own courses, with its enrollment count.
#[derive(Debug, Clone, PartialEq, Serialize)]
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
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrolledStudent {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub enrolled_at: DateTime<Utc>,
}

/// A course a student is enrolled in, with the enrollment timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrolledCourse {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub instructor: String,
    pub enrolled_at: DateTime<Utc>,
}
