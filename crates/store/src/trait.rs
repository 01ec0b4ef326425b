use courseforge_core::{CourseId, UserId};

use crate::error::StoreResult;
use crate::records::{
    AdminCourse, CourseListing, CourseRecord, EnrolledCourse, EnrolledStudent, EnrollmentRecord,
    InstructorCourse, NewCourse, NewUser, PendingCourse, PendingInstructor, PublicUser, UserRecord,
};

/// Persistence seam for accounts, courses and enrollments.
///
/// ## Design Principles
///
/// - **No storage assumptions**: works with the in-memory implementation
///   (tests/dev) and the Postgres backend (production).
/// - **Integrity lives here**: unique emails and the one-enrollment-per-
///   student-and-course guarantee are enforced by implementations, not by
///   callers. Violations surface as [`crate::StoreError::Conflict`].
/// - **Multi-row mutations are atomic**: deletes that touch several tables
///   (a course and its enrollments, a user and everything they own) happen
///   all-or-nothing.
///
/// ## Return Conventions
///
/// - Lookups return `Ok(None)` for absent rows.
/// - Targeted updates/deletes return `Ok(false)` when nothing matched, so the
///   API layer can answer 404 without a prior existence query.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ── users ────────────────────────────────────────────────────────────

    /// Insert a user. Duplicate email is a conflict.
    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>>;

    /// Every account, hash omitted.
    async fn list_users(&self) -> StoreResult<Vec<PublicUser>>;

    /// Rename/re-address a user. Email collision with another user is a
    /// conflict.
    async fn update_user(&self, id: UserId, name: &str, email: &str) -> StoreResult<bool>;

    /// Remove a user and everything hanging off them: their enrollments,
    /// enrollments into courses they own, then the owned courses themselves.
    async fn delete_user(&self, id: UserId) -> StoreResult<bool>;

    /// Instructors that registered but have not been approved yet.
    async fn list_pending_instructors(&self) -> StoreResult<Vec<PendingInstructor>>;

    /// Mark an instructor approved. Scoped to the instructor role; approving
    /// an already-approved instructor succeeds.
    async fn approve_instructor(&self, id: UserId) -> StoreResult<bool>;

    /// Remove an instructor account (and any dependents). Scoped to the
    /// instructor role: other accounts are untouched and report `false`.
    async fn reject_instructor(&self, id: UserId) -> StoreResult<bool>;

    // ── courses ──────────────────────────────────────────────────────────

    /// Insert a course. Courses start unapproved.
    async fn insert_course(&self, course: NewCourse) -> StoreResult<CourseRecord>;

    /// The student-facing catalog: approved courses only.
    async fn list_approved_courses(&self) -> StoreResult<Vec<CourseListing>>;

    /// Courses awaiting admin review.
    async fn list_pending_courses(&self) -> StoreResult<Vec<PendingCourse>>;

    /// Every course with approval state and enrollment count.
    async fn list_all_courses(&self) -> StoreResult<Vec<AdminCourse>>;

    /// Mark a course approved. Idempotent.
    async fn approve_course(&self, id: CourseId) -> StoreResult<bool>;

    /// Remove a course and its enrollments atomically.
    async fn delete_course(&self, id: CourseId) -> StoreResult<bool>;

    /// Who owns a course, if it exists.
    async fn course_owner(&self, id: CourseId) -> StoreResult<Option<UserId>>;

    async fn list_instructor_courses(
        &self,
        instructor: UserId,
    ) -> StoreResult<Vec<InstructorCourse>>;

    /// The roster of a course, oldest enrollment first.
    async fn list_course_students(&self, course: CourseId) -> StoreResult<Vec<EnrolledStudent>>;

    // ── enrollments ──────────────────────────────────────────────────────

    /// Enroll a student into an approved course.
    ///
    /// A missing or unapproved course is a
    /// [`crate::StoreError::MissingReference`]; a repeat enrollment is a
    /// [`crate::StoreError::Conflict`].
    async fn insert_enrollment(
        &self,
        student: UserId,
        course: CourseId,
    ) -> StoreResult<EnrollmentRecord>;

    /// The student's enrollments made on the current (server-local) day.
    async fn list_today_enrollments(&self, student: UserId) -> StoreResult<Vec<EnrolledCourse>>;

    /// All of the student's enrollments, newest first.
    async fn list_student_enrollments(&self, student: UserId) -> StoreResult<Vec<EnrolledCourse>>;
}
