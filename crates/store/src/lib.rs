//! `courseforge-store` — persistence layer.
//!
//! One [`Store`] trait, two backends: [`InMemoryStore`] for tests and
//! database-less development, [`PostgresStore`] for production. Both enforce
//! the same integrity guarantees (unique emails, at most one enrollment per
//! student and course) so callers see identical semantics either way.

pub mod error;
pub mod in_memory;
pub mod postgres;
pub mod records;
mod r#trait;

pub use error::{StoreError, StoreResult};
pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use r#trait::Store;
pub use records::{
    AdminCourse, CourseListing, CourseRecord, EnrolledCourse, EnrolledStudent, EnrollmentRecord,
    InstructorCourse, NewCourse, NewUser, PendingCourse, PendingInstructor, PublicUser, UserRecord,
};
