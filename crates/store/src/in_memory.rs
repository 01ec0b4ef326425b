//! In-memory store.
//!
//! Intended for tests and database-less development. Every operation takes a
//! single lock acquisition, so check-then-insert sequences (duplicate email,
//! duplicate enrollment) are atomic within the process.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::{Local, Utc};

use courseforge_auth::Role;
use courseforge_core::{CourseId, EnrollmentId, UserId};

use crate::error::{StoreError, StoreResult};
use crate::r#trait::Store;
use crate::records::{
    AdminCourse, CourseListing, CourseRecord, EnrolledCourse, EnrolledStudent, EnrollmentRecord,
    InstructorCourse, NewCourse, NewUser, PendingCourse, PendingInstructor, PublicUser, UserRecord,
};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, UserRecord>,
    courses: HashMap<CourseId, CourseRecord>,
    enrollments: HashMap<EnrollmentId, EnrollmentRecord>,
}

impl State {
    fn email_taken(&self, email: &str, excluding: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != excluding)
    }

    fn instructor_name(&self, id: UserId) -> Option<String> {
        self.users.get(&id).map(|u| u.name.clone())
    }

    fn enrollment_count(&self, course: CourseId) -> i64 {
        self.enrollments
            .values()
            .filter(|e| e.course_id == course)
            .count() as i64
    }

    /// Remove a user plus enrollments and courses hanging off them.
    fn cascade_delete_user(&mut self, id: UserId) {
        let owned: HashSet<CourseId> = self
            .courses
            .values()
            .filter(|c| c.instructor_id == id)
            .map(|c| c.id)
            .collect();
        self.enrollments
            .retain(|_, e| e.student_id != id && !owned.contains(&e.course_id));
        self.courses.retain(|_, c| c.instructor_id != id);
        self.users.remove(&id);
    }
}

/// In-memory implementation of [`Store`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(operation: &'static str) -> StoreError {
    StoreError::backend(operation, "lock poisoned")
}

#[async_trait::async_trait]
impl Store for InMemoryStore {
    async fn insert_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        let mut state = self.state.write().map_err(|_| poisoned("insert_user"))?;
        if state.email_taken(&user.email, None) {
            return Err(StoreError::conflict("duplicate email"));
        }
        let record = UserRecord {
            id: UserId::new(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            approved: user.approved,
            created_at: Utc::now(),
        };
        state.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let state = self
            .state
            .read()
            .map_err(|_| poisoned("find_user_by_email"))?;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        let state = self.state.read().map_err(|_| poisoned("find_user_by_id"))?;
        Ok(state.users.get(&id).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<PublicUser>> {
        let state = self.state.read().map_err(|_| poisoned("list_users"))?;
        let mut users: Vec<PublicUser> = state
            .users
            .values()
            .map(|u| PublicUser {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
                role: u.role,
                approved: u.approved,
            })
            .collect();
        users.sort_by_key(|u| *u.id.as_uuid());
        Ok(users)
    }

    async fn update_user(&self, id: UserId, name: &str, email: &str) -> StoreResult<bool> {
        let mut state = self.state.write().map_err(|_| poisoned("update_user"))?;
        if !state.users.contains_key(&id) {
            return Ok(false);
        }
        if state.email_taken(email, Some(id)) {
            return Err(StoreError::conflict("duplicate email"));
        }
        if let Some(user) = state.users.get_mut(&id) {
            user.name = name.to_string();
            user.email = email.to_string();
        }
        Ok(true)
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<bool> {
        let mut state = self.state.write().map_err(|_| poisoned("delete_user"))?;
        if !state.users.contains_key(&id) {
            return Ok(false);
        }
        state.cascade_delete_user(id);
        Ok(true)
    }

    async fn list_pending_instructors(&self) -> StoreResult<Vec<PendingInstructor>> {
        let state = self
            .state
            .read()
            .map_err(|_| poisoned("list_pending_instructors"))?;
        let mut pending: Vec<PendingInstructor> = state
            .users
            .values()
            .filter(|u| u.role == Role::Instructor && !u.approved)
            .map(|u| PendingInstructor {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
            })
            .collect();
        pending.sort_by_key(|u| *u.id.as_uuid());
        Ok(pending)
    }

    async fn approve_instructor(&self, id: UserId) -> StoreResult<bool> {
        let mut state = self
            .state
            .write()
            .map_err(|_| poisoned("approve_instructor"))?;
        match state.users.get_mut(&id) {
            Some(user) if user.role == Role::Instructor => {
                user.approved = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn reject_instructor(&self, id: UserId) -> StoreResult<bool> {
        let mut state = self
            .state
            .write()
            .map_err(|_| poisoned("reject_instructor"))?;
        let is_instructor = matches!(
            state.users.get(&id),
            Some(user) if user.role == Role::Instructor
        );
        if !is_instructor {
            return Ok(false);
        }
        state.cascade_delete_user(id);
        Ok(true)
    }

    async fn insert_course(&self, course: NewCourse) -> StoreResult<CourseRecord> {
        let mut state = self.state.write().map_err(|_| poisoned("insert_course"))?;
        if !state.users.contains_key(&course.instructor_id) {
            return Err(StoreError::missing("instructor does not exist"));
        }
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
        state.courses.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_approved_courses(&self) -> StoreResult<Vec<CourseListing>> {
        let state = self
            .state
            .read()
            .map_err(|_| poisoned("list_approved_courses"))?;
        let mut listings: Vec<CourseListing> = state
            .courses
            .values()
            .filter(|c| c.approved)
            .filter_map(|c| {
                let instructor = state.instructor_name(c.instructor_id)?;
                Some(CourseListing {
                    id: c.id,
                    title: c.title.clone(),
                    description: c.description.clone(),
                    price: c.price,
                    category: c.category.clone(),
                    instructor,
                })
            })
            .collect();
        listings.sort_by_key(|c| std::cmp::Reverse(*c.id.as_uuid()));
        Ok(listings)
    }

    async fn list_pending_courses(&self) -> StoreResult<Vec<PendingCourse>> {
        let state = self
            .state
            .read()
            .map_err(|_| poisoned("list_pending_courses"))?;
        let mut pending: Vec<PendingCourse> = state
            .courses
            .values()
            .filter(|c| !c.approved)
            .filter_map(|c| {
                let instructor = state.instructor_name(c.instructor_id)?;
                Some(PendingCourse {
                    id: c.id,
                    title: c.title.clone(),
                    price: c.price,
                    instructor,
                })
            })
            .collect();
        pending.sort_by_key(|c| *c.id.as_uuid());
        Ok(pending)
    }

    async fn list_all_courses(&self) -> StoreResult<Vec<AdminCourse>> {
        let state = self.state.read().map_err(|_| poisoned("list_all_courses"))?;
        let mut courses: Vec<AdminCourse> = state
            .courses
            .values()
            .filter_map(|c| {
                let instructor = state.instructor_name(c.instructor_id)?;
                Some(AdminCourse {
                    id: c.id,
                    title: c.title.clone(),
                    price: c.price,
                    approved: c.approved,
                    instructor,
                    students: state.enrollment_count(c.id),
                })
            })
            .collect();
        courses.sort_by_key(|c| std::cmp::Reverse(*c.id.as_uuid()));
        Ok(courses)
    }

    async fn approve_course(&self, id: CourseId) -> StoreResult<bool> {
        let mut state = self.state.write().map_err(|_| poisoned("approve_course"))?;
        match state.courses.get_mut(&id) {
            Some(course) => {
                course.approved = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_course(&self, id: CourseId) -> StoreResult<bool> {
        let mut state = self.state.write().map_err(|_| poisoned("delete_course"))?;
        if state.courses.remove(&id).is_none() {
            return Ok(false);
        }
        state.enrollments.retain(|_, e| e.course_id != id);
        Ok(true)
    }

    async fn course_owner(&self, id: CourseId) -> StoreResult<Option<UserId>> {
        let state = self.state.read().map_err(|_| poisoned("course_owner"))?;
        Ok(state.courses.get(&id).map(|c| c.instructor_id))
    }

    async fn list_instructor_courses(
        &self,
        instructor: UserId,
    ) -> StoreResult<Vec<InstructorCourse>> {
        let state = self
            .state
            .read()
            .map_err(|_| poisoned("list_instructor_courses"))?;
        let mut courses: Vec<InstructorCourse> = state
            .courses
            .values()
            .filter(|c| c.instructor_id == instructor)
            .map(|c| InstructorCourse {
                id: c.id,
                title: c.title.clone(),
                description: c.description.clone(),
                price: c.price,
                category: c.category.clone(),
                approved: c.approved,
                students: state.enrollment_count(c.id),
            })
            .collect();
        courses.sort_by_key(|c| std::cmp::Reverse(*c.id.as_uuid()));
        Ok(courses)
    }

    async fn list_course_students(&self, course: CourseId) -> StoreResult<Vec<EnrolledStudent>> {
        let state = self
            .state
            .read()
            .map_err(|_| poisoned("list_course_students"))?;
        let mut roster: Vec<(EnrollmentId, EnrolledStudent)> = state
            .enrollments
            .values()
            .filter(|e| e.course_id == course)
            .filter_map(|e| {
                let student = state.users.get(&e.student_id)?;
                Some((
                    e.id,
                    EnrolledStudent {
                        id: student.id,
                        name: student.name.clone(),
                        email: student.email.clone(),
                        enrolled_at: e.created_at,
                    },
                ))
            })
            .collect();
        roster.sort_by_key(|(id, _)| *id.as_uuid());
        Ok(roster.into_iter().map(|(_, s)| s).collect())
    }

    async fn insert_enrollment(
        &self,
        student: UserId,
        course: CourseId,
    ) -> StoreResult<EnrollmentRecord> {
        let mut state = self
            .state
            .write()
            .map_err(|_| poisoned("insert_enrollment"))?;
        match state.courses.get(&course) {
            Some(c) if c.approved => {}
            _ => return Err(StoreError::missing("course not found or not approved")),
        }
        let duplicate = state
            .enrollments
            .values()
            .any(|e| e.student_id == student && e.course_id == course);
        if duplicate {
            return Err(StoreError::conflict("already enrolled"));
        }
        let record = EnrollmentRecord {
            id: EnrollmentId::new(),
            student_id: student,
            course_id: course,
            created_at: Utc::now(),
        };
        state.enrollments.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list_today_enrollments(&self, student: UserId) -> StoreResult<Vec<EnrolledCourse>> {
        let state = self
            .state
            .read()
            .map_err(|_| poisoned("list_today_enrollments"))?;
        let today = Local::now().date_naive();
        let mut rows = enrolled_courses(&state, student, |e| {
            e.created_at.with_timezone(&Local).date_naive() == today
        });
        rows.sort_by_key(|c| std::cmp::Reverse(c.enrolled_at));
        Ok(rows)
    }

    async fn list_student_enrollments(&self, student: UserId) -> StoreResult<Vec<EnrolledCourse>> {
        let state = self
            .state
            .read()
            .map_err(|_| poisoned("list_student_enrollments"))?;
        let mut rows = enrolled_courses(&state, student, |_| true);
        rows.sort_by_key(|c| std::cmp::Reverse(c.enrolled_at));
        Ok(rows)
    }
}

fn enrolled_courses(
    state: &State,
    student: UserId,
    mut keep: impl FnMut(&EnrollmentRecord) -> bool,
) -> Vec<EnrolledCourse> {
    state
        .enrollments
        .values()
        .filter(|e| e.student_id == student && keep(e))
        .filter_map(|e| {
            let course = state.courses.get(&e.course_id)?;
            let instructor = state.instructor_name(course.instructor_id)?;
            Some(EnrolledCourse {
                id: course.id,
                title: course.title.clone(),
                description: course.description.clone(),
                price: course.price,
                instructor,
                enrolled_at: e.created_at,
            })
        })
        .collect()
}
