//! The typed API client.

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use courseforge_auth::Role;
use courseforge_core::{CourseId, UserId};

use crate::error::ClientError;
use crate::session::{Session, SessionUser};
use crate::types::{
    AdminCourse, CourseDraft, CourseListing, EnrolledCourse, EnrolledStudent, Identity,
    InstructorCourse, PendingCourse, PendingInstructor, UserSummary,
};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: SessionUser,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    user: Identity,
}

#[derive(Debug, Deserialize)]
struct CreatedCourse {
    #[serde(rename = "courseId")]
    course_id: CourseId,
}

/// Typed client owning the [`Session`].
///
/// One method per API operation. Protected calls attach the session's bearer
/// token and fail fast with [`ClientError::NotLoggedIn`] when there is none;
/// a 401 from the server drops the session, since the token it held no
/// longer verifies.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            session: Session::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // ── auth ─────────────────────────────────────────────────────────────

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<(), ClientError> {
        let req = self.http.post(self.url("/api/auth/register")).json(&json!({
            "name": name,
            "email": email,
            "password": password,
            "role": role,
        }));
        self.send_public(req).await?;
        Ok(())
    }

    /// Log in and remember the session. The held session changes only on
    /// success.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<SessionUser, ClientError> {
        let req = self.http.post(self.url("/api/auth/login")).json(&json!({
            "email": email,
            "password": password,
        }));
        let res = self.send_public(req).await?;
        let body: LoginResponse = res.json().await?;
        self.session.set(body.token, body.user.clone());
        Ok(body.user)
    }

    /// Forget the session. Tokens are stateless, so there is no server call.
    pub fn logout(&mut self) {
        self.session.clear();
    }

    pub async fn me(&mut self) -> Result<Identity, ClientError> {
        let req = self.authed(Method::GET, "/api/users/me")?;
        let res = self.send_authed(req).await?;
        let body: MeResponse = res.json().await?;
        Ok(body.user)
    }

    // ── student ──────────────────────────────────────────────────────────

    pub async fn catalog(&mut self) -> Result<Vec<CourseListing>, ClientError> {
        self.get_json("/api/student/courses").await
    }

    pub async fn enroll(&mut self, course: CourseId) -> Result<(), ClientError> {
        let req = self
            .authed(Method::POST, "/api/student/enroll")?
            .json(&json!({ "courseId": course }));
        self.send_authed(req).await?;
        Ok(())
    }

    pub async fn today_enrollments(&mut self) -> Result<Vec<EnrolledCourse>, ClientError> {
        self.get_json("/api/student/today-courses").await
    }

    pub async fn my_enrollments(&mut self) -> Result<Vec<EnrolledCourse>, ClientError> {
        self.get_json("/api/student/my-courses").await
    }

    // ── instructor ───────────────────────────────────────────────────────

    pub async fn create_course(&mut self, draft: &CourseDraft) -> Result<CourseId, ClientError> {
        let req = self
            .authed(Method::POST, "/api/instructor/create-course")?
            .json(draft);
        let res = self.send_authed(req).await?;
        let created: CreatedCourse = res.json().await?;
        Ok(created.course_id)
    }

    pub async fn my_courses(&mut self) -> Result<Vec<InstructorCourse>, ClientError> {
        self.get_json("/api/instructor/my-courses").await
    }

    pub async fn course_students(
        &mut self,
        course: CourseId,
    ) -> Result<Vec<EnrolledStudent>, ClientError> {
        self.get_json(&format!("/api/instructor/course/{course}/students"))
            .await
    }

    pub async fn delete_course(&mut self, course: CourseId) -> Result<(), ClientError> {
        self.call(Method::DELETE, &format!("/api/instructor/course/{course}"))
            .await
    }

    // ── admin ────────────────────────────────────────────────────────────

    pub async fn pending_instructors(&mut self) -> Result<Vec<PendingInstructor>, ClientError> {
        self.get_json("/api/admin/pending-instructors").await
    }

    pub async fn approve_instructor(&mut self, id: UserId) -> Result<(), ClientError> {
        self.call(Method::PUT, &format!("/api/admin/approve/{id}"))
            .await
    }

    pub async fn reject_instructor(&mut self, id: UserId) -> Result<(), ClientError> {
        self.call(Method::DELETE, &format!("/api/admin/reject/{id}"))
            .await
    }

    pub async fn pending_courses(&mut self) -> Result<Vec<PendingCourse>, ClientError> {
        self.get_json("/api/admin/pending-courses").await
    }

    pub async fn approve_course(&mut self, id: CourseId) -> Result<(), ClientError> {
        self.call(Method::PUT, &format!("/api/admin/approve-course/{id}"))
            .await
    }

    pub async fn reject_course(&mut self, id: CourseId) -> Result<(), ClientError> {
        self.call(Method::DELETE, &format!("/api/admin/reject-course/{id}"))
            .await
    }

    pub async fn all_courses(&mut self) -> Result<Vec<AdminCourse>, ClientError> {
        self.get_json("/api/admin/courses").await
    }

    pub async fn all_users(&mut self) -> Result<Vec<UserSummary>, ClientError> {
        self.get_json("/api/admin/users").await
    }

    pub async fn update_user(
        &mut self,
        id: UserId,
        name: &str,
        email: &str,
    ) -> Result<(), ClientError> {
        let req = self
            .authed(Method::PUT, &format!("/api/admin/user/{id}"))?
            .json(&json!({ "name": name, "email": email }));
        self.send_authed(req).await?;
        Ok(())
    }

    pub async fn delete_user(&mut self, id: UserId) -> Result<(), ClientError> {
        self.call(Method::DELETE, &format!("/api/admin/user/{id}"))
            .await
    }

    // ── plumbing ─────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ClientError> {
        let token = self.session.token().ok_or(ClientError::NotLoggedIn)?;
        Ok(self.http.request(method, self.url(path)).bearer_auth(token))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &mut self,
        path: &str,
    ) -> Result<T, ClientError> {
        let req = self.authed(Method::GET, path)?;
        let res = self.send_authed(req).await?;
        Ok(res.json().await?)
    }

    /// Bodyless protected call where only success matters.
    async fn call(&mut self, method: Method, path: &str) -> Result<(), ClientError> {
        let req = self.authed(method, path)?;
        self.send_authed(req).await?;
        Ok(())
    }

    /// Send a request carrying the session token. A 401 means that token no
    /// longer verifies, so the session goes with the error.
    async fn send_authed(
        &mut self,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let res = req.send().await?;
        if res.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.session.clear();
        }
        Self::check(res).await
    }

    async fn send_public(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let res = req.send().await?;
        Self::check(res).await
    }

    /// Surface non-2xx answers as [`ClientError::Api`] with the server's
    /// `message` text.
    async fn check(res: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let message = match res.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        Err(ClientError::Api { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.url("/health"), "http://localhost:8080/health");
    }

    #[test]
    fn protected_calls_fail_fast_without_a_session() {
        let client = ApiClient::new("http://localhost:8080");
        let err = client.authed(Method::GET, "/api/users/me").unwrap_err();
        assert!(matches!(err, ClientError::NotLoggedIn));
    }
}
