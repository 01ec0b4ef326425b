//! Postgres-backed store implementation.
//!
//! Integrity rules are enforced at the database level: `users.email` is
//! unique, `enrollments (student_id, course_id)` is unique, and multi-table
//! deletes run inside explicit transactions.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to [`StoreError`] as follows:
//!
//! | PostgreSQL Error Code | StoreError | Scenario |
//! |----------------------|------------|----------|
//! | `23505` (unique violation) | `Conflict` | Duplicate email / duplicate enrollment |
//! | `23503` (foreign key violation) | `MissingReference` | Insert referencing a deleted row |
//! | Any other | `Backend` | Check violations, connection failures, pool closed, ... |

use chrono::Utc;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use courseforge_auth::Role;
use courseforge_core::{CourseId, EnrollmentId, UserId};

use crate::error::{StoreError, StoreResult};
use crate::r#trait::Store;
use crate::records::{
    AdminCourse, CourseListing, CourseRecord, EnrolledCourse, EnrolledStudent, EnrollmentRecord,
    InstructorCourse, NewCourse, NewUser, PendingCourse, PendingInstructor, PublicUser, UserRecord,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('student', 'instructor', 'admin')),
        approved BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS courses (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        price DOUBLE PRECISION NOT NULL CHECK (price >= 0),
        category TEXT,
        instructor_id UUID NOT NULL REFERENCES users(id),
        approved BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS enrollments (
        id UUID PRIMARY KEY,
        student_id UUID NOT NULL REFERENCES users(id),
        course_id UUID NOT NULL REFERENCES courses(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (student_id, course_id)
    )
    "#,
];

/// Postgres-backed implementation of [`Store`].
///
/// Wraps a SQLx connection pool, so it is cheap to clone and safe to share
/// across tasks.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database and apply the schema.
    #[instrument(skip(database_url), err)]
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::backend("connect", e.to_string()))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create the tables if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Store for PostgresStore {
    #[instrument(skip(self, user), fields(email = %user.email, role = %user.role), err)]
    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        let record = UserRecord {
            id: UserId::new(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            approved: user.approved,
            created_at: Utc::now(),
        };
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, approved, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.role.as_str())
        .bind(record.approved)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::conflict("duplicate email")
            } else {
                map_sqlx_error("insert_user", e)
            }
        })?;
        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, role, approved, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_email", e))
    }

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, role, approved, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_id", e))
    }

    async fn list_users(&self) -> StoreResult<Vec<PublicUser>> {
        sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT id, name, email, role, approved
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_users", e))
    }

    #[instrument(skip(self, name, email), err)]
    async fn update_user(&self, id: UserId, name: &str, email: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET name = $1, email = $2 WHERE id = $3")
            .bind(name)
            .bind(email)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::conflict("duplicate email")
                } else {
                    map_sqlx_error("update_user", e)
                }
            })?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;

        cascade_delete_user(&mut tx, id).await?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("delete_user", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_pending_instructors(&self) -> StoreResult<Vec<PendingInstructor>> {
        sqlx::query_as::<_, PendingInstructor>(
            r#"
            SELECT id, name, email
            FROM users
            WHERE role = 'instructor' AND approved = FALSE
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_pending_instructors", e))
    }

    #[instrument(skip(self), err)]
    async fn approve_instructor(&self, id: UserId) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE users SET approved = TRUE WHERE id = $1 AND role = 'instructor'")
                .bind(id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("approve_instructor", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn reject_instructor(&self, id: UserId) -> StoreResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("reject_instructor", e))?;

        let matched: Option<uuid::Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = $1 AND role = 'instructor'")
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("reject_instructor", e))?;
        if matched.is_none() {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("reject_instructor", e))?;
            return Ok(false);
        }

        cascade_delete_user(&mut tx, id).await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("reject_instructor", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("reject_instructor", e))?;
        Ok(true)
    }

    #[instrument(skip(self, course), fields(instructor_id = %course.instructor_id), err)]
    async fn insert_course(&self, course: NewCourse) -> StoreResult<CourseRecord> {
        let record = CourseRecord {
            id: CourseId::new(),
            title: course.title,
            description: course.description,
            price: course.price,
            category: course.category,
            instructor_id: course.instructor_id,
            approved: false,
            created_at: Utc::now(),
        };
        sqlx::query(
            r#"
            INSERT INTO courses (id, title, description, price, category, instructor_id, approved, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.title)
        .bind(&record.description)
        .bind(record.price)
        .bind(record.category.as_deref())
        .bind(record.instructor_id.as_uuid())
        .bind(record.approved)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_course", e))?;
        Ok(record)
    }

    async fn list_approved_courses(&self) -> StoreResult<Vec<CourseListing>> {
        sqlx::query_as::<_, CourseListing>(
            r#"
            SELECT c.id, c.title, c.description, c.price, c.category, u.name AS instructor
            FROM courses c
            JOIN users u ON u.id = c.instructor_id
            WHERE c.approved = TRUE
            ORDER BY c.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_approved_courses", e))
    }

    async fn list_pending_courses(&self) -> StoreResult<Vec<PendingCourse>> {
        sqlx::query_as::<_, PendingCourse>(
            r#"
            SELECT c.id, c.title, c.price, u.name AS instructor
            FROM courses c
            JOIN users u ON u.id = c.instructor_id
            WHERE c.approved = FALSE
            ORDER BY c.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_pending_courses", e))
    }

    async fn list_all_courses(&self) -> StoreResult<Vec<AdminCourse>> {
        sqlx::query_as::<_, AdminCourse>(
            r#"
            SELECT c.id, c.title, c.price, c.approved, u.name AS instructor,
                   COUNT(e.id) AS students
            FROM courses c
            JOIN users u ON u.id = c.instructor_id
            LEFT JOIN enrollments e ON e.course_id = c.id
            GROUP BY c.id, c.title, c.price, c.approved, u.name
            ORDER BY c.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_all_courses", e))
    }

    #[instrument(skip(self), err)]
    async fn approve_course(&self, id: CourseId) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE courses SET approved = TRUE WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("approve_course", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn delete_course(&self, id: CourseId) -> StoreResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("delete_course", e))?;

        sqlx::query("DELETE FROM enrollments WHERE course_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_course", e))?;
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_course", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("delete_course", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn course_owner(&self, id: CourseId) -> StoreResult<Option<UserId>> {
        let owner: Option<uuid::Uuid> =
            sqlx::query_scalar("SELECT instructor_id FROM courses WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("course_owner", e))?;
        Ok(owner.map(UserId::from_uuid))
    }

    async fn list_instructor_courses(
        &self,
        instructor: UserId,
    ) -> StoreResult<Vec<InstructorCourse>> {
        sqlx::query_as::<_, InstructorCourse>(
            r#"
            SELECT c.id, c.title, c.description, c.price, c.category, c.approved,
                   COUNT(e.id) AS students
            FROM courses c
            LEFT JOIN enrollments e ON e.course_id = c.id
            WHERE c.instructor_id = $1
            GROUP BY c.id, c.title, c.description, c.price, c.category, c.approved
            ORDER BY c.id DESC
            "#,
        )
        .bind(instructor.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_instructor_courses", e))
    }

    async fn list_course_students(&self, course: CourseId) -> StoreResult<Vec<EnrolledStudent>> {
        sqlx::query_as::<_, EnrolledStudent>(
            r#"
            SELECT u.id, u.name, u.email, e.created_at AS enrolled_at
            FROM enrollments e
            JOIN users u ON u.id = e.student_id
            WHERE e.course_id = $1
            ORDER BY e.created_at ASC
            "#,
        )
        .bind(course.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_course_students", e))
    }

    #[instrument(skip(self), err)]
    async fn insert_enrollment(
        &self,
        student: UserId,
        course: CourseId,
    ) -> StoreResult<EnrollmentRecord> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("insert_enrollment", e))?;

        let approved: Option<bool> = sqlx::query_scalar("SELECT approved FROM courses WHERE id = $1")
            .bind(course.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_enrollment", e))?;
        if approved != Some(true) {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("insert_enrollment", e))?;
            return Err(StoreError::missing("course not found or not approved"));
        }

        let record = EnrollmentRecord {
            id: EnrollmentId::new(),
            student_id: student,
            course_id: course,
            created_at: Utc::now(),
        };
        sqlx::query(
            r#"
            INSERT INTO enrollments (id, student_id, course_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.student_id.as_uuid())
        .bind(record.course_id.as_uuid())
        .bind(record.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::conflict("already enrolled")
            } else {
                map_sqlx_error("insert_enrollment", e)
            }
        })?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("insert_enrollment", e))?;
        Ok(record)
    }

    async fn list_today_enrollments(&self, student: UserId) -> StoreResult<Vec<EnrolledCourse>> {
        sqlx::query_as::<_, EnrolledCourse>(
            r#"
            SELECT c.id, c.title, c.description, c.price, u.name AS instructor,
                   e.created_at AS enrolled_at
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            JOIN users u ON u.id = c.instructor_id
            WHERE e.student_id = $1 AND e.created_at::date = CURRENT_DATE
            ORDER BY e.created_at DESC
            "#,
        )
        .bind(student.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_today_enrollments", e))
    }

    async fn list_student_enrollments(&self, student: UserId) -> StoreResult<Vec<EnrolledCourse>> {
        sqlx::query_as::<_, EnrolledCourse>(
            r#"
            SELECT c.id, c.title, c.description, c.price, u.name AS instructor,
                   e.created_at AS enrolled_at
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            JOIN users u ON u.id = c.instructor_id
            WHERE e.student_id = $1
            ORDER BY e.created_at DESC
            "#,
        )
        .bind(student.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_student_enrollments", e))
    }
}

/// Delete the rows hanging off a user: their enrollments, enrollments into
/// their courses, then the courses. The user row itself is the caller's job.
async fn cascade_delete_user(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: UserId,
) -> StoreResult<()> {
    sqlx::query("DELETE FROM enrollments WHERE student_id = $1")
        .bind(id.as_uuid())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("cascade_delete_user", e))?;
    sqlx::query(
        "DELETE FROM enrollments WHERE course_id IN (SELECT id FROM courses WHERE instructor_id = $1)",
    )
    .bind(id.as_uuid())
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("cascade_delete_user", e))?;
    sqlx::query("DELETE FROM courses WHERE instructor_id = $1")
        .bind(id.as_uuid())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("cascade_delete_user", e))?;
    Ok(())
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") => StoreError::MissingReference(msg),
                _ => StoreError::backend(operation, msg),
            }
        }
        sqlx::Error::PoolClosed => StoreError::backend(operation, "connection pool closed"),
        sqlx::Error::RowNotFound => {
            // Should not happen: lookups use fetch_optional/fetch_all.
            StoreError::backend(operation, "unexpected row not found")
        }
        other => StoreError::backend(operation, other.to_string()),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

fn parse_role(raw: &str) -> Result<Role, sqlx::Error> {
    raw.parse::<Role>().map_err(|e| sqlx::Error::ColumnDecode {
        index: "role".to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;
        Ok(UserRecord {
            id: UserId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: parse_role(&role)?,
            approved: row.try_get("approved")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for PublicUser {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;
        Ok(PublicUser {
            id: UserId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            role: parse_role(&role)?,
            approved: row.try_get("approved")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for PendingInstructor {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(PendingInstructor {
            id: UserId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for CourseListing {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CourseListing {
            id: CourseId::from_uuid(row.try_get("id")?),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            category: row.try_get("category")?,
            instructor: row.try_get("instructor")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for PendingCourse {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(PendingCourse {
            id: CourseId::from_uuid(row.try_get("id")?),
            title: row.try_get("title")?,
            price: row.try_get("price")?,
            instructor: row.try_get("instructor")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AdminCourse {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(AdminCourse {
            id: CourseId::from_uuid(row.try_get("id")?),
            title: row.try_get("title")?,
            price: row.try_get("price")?,
            approved: row.try_get("approved")?,
            instructor: row.try_get("instructor")?,
            students: row.try_get("students")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for InstructorCourse {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(InstructorCourse {
            id: CourseId::from_uuid(row.try_get("id")?),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            category: row.try_get("category")?,
            approved: row.try_get("approved")?,
            students: row.try_get("students")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for EnrolledStudent {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(EnrolledStudent {
            id: UserId::from_uuid(row.try_get("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            enrolled_at: row.try_get("enrolled_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for EnrolledCourse {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(EnrolledCourse {
            id: CourseId::from_uuid(row.try_get("id")?),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            instructor: row.try_get("instructor")?,
            enrolled_at: row.try_get("enrolled_at")?,
        })
    }
}
