use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

use courseforge_api::app::{build_app, services::AppServices};
use courseforge_auth::{Claims, Hs256Tokens, Role, TOKEN_TTL_SECS, TokenService};
use courseforge_core::UserId;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    services: Arc<AppServices>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over the in-memory store, on an ephemeral port.
        let services = Arc::new(AppServices::in_memory(JWT_SECRET));
        let app = build_app(services.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            services,
            handle,
        }
    }

    /// Mint a token the way the server would. Role gates never consult the
    /// store, so an admin token does not need an admin row behind it.
    fn token_for(&self, role: Role) -> String {
        self.services
            .tokens()
            .issue(UserId::new(), role)
            .expect("failed to issue token")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn message(body: &Value) -> &str {
    body["message"].as_str().unwrap_or_default()
}

fn expired_token() -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: UserId::new(),
        role: Role::Student,
        iat: now - 2 * TOKEN_TTL_SECS,
        exp: now - TOKEN_TTL_SECS,
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn register(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
    email: &str,
    password: &str,
    role: Option<&str>,
) -> reqwest::Response {
    let mut body = json!({ "name": name, "email": email, "password": password });
    if let Some(role) = role {
        body["role"] = json!(role);
    }
    client
        .post(format!("{base_url}/api/auth/register"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

async fn login(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap()
}

async fn login_token(
    client: &reqwest::Client,
    base_url: &str,
    email: &str,
    password: &str,
) -> String {
    let res = login(client, base_url, email, password).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Login successful");
    body["token"].as_str().unwrap().to_string()
}

/// Find the instructor in the pending queue by email and approve them.
/// Returns the instructor's id.
async fn approve_instructor(
    client: &reqwest::Client,
    base_url: &str,
    admin_token: &str,
    email: &str,
) -> String {
    let pending: Value = client
        .get(format!("{base_url}/api/admin/pending-instructors"))
        .bearer_auth(admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = pending
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["email"] == email)
        .expect("instructor not in the pending queue")["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = client
        .put(format!("{base_url}/api/admin/approve/{id}"))
        .bearer_auth(admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    id
}

/// Register + approve an instructor, returning their bearer token.
async fn approved_instructor(
    client: &reqwest::Client,
    srv: &TestServer,
    name: &str,
    email: &str,
) -> String {
    let res = register(client, &srv.base_url, name, email, "pw123", Some("instructor")).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let admin = srv.token_for(Role::Admin);
    approve_instructor(client, &srv.base_url, &admin, email).await;
    login_token(client, &srv.base_url, email, "pw123").await
}

async fn create_course(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    title: &str,
    price: f64,
) -> String {
    let res = client
        .post(format!("{base_url}/api/instructor/create-course"))
        .bearer_auth(token)
        .json(&json!({
            "title": title,
            "description": format!("{title} description"),
            "price": price,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Course created successfully");
    body["courseId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // No token at all.
    let res = client
        .get(format!("{}/api/users/me", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "auth_error");
    assert_eq!(message(&body), "Missing or invalid token");

    // Garbage token.
    let res = client
        .get(format!("{}/api/users/me", srv.base_url))
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Signed with a different secret.
    let forged = Hs256Tokens::new("other-secret")
        .issue(UserId::new(), Role::Admin)
        .unwrap();
    let res = client
        .get(format!("{}/api/admin/users", srv.base_url))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_tokens_are_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/users/me", srv.base_url))
        .bearer_auth(expired_token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Missing or invalid token");
}

#[tokio::test]
async fn me_echoes_the_token_identity() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let user_id = UserId::new();
    let token = srv
        .services
        .tokens()
        .issue(user_id, Role::Instructor)
        .unwrap();

    let res = client
        .get(format!("{}/api/users/me", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "User profile");
    assert_eq!(body["user"]["id"], user_id.to_string());
    assert_eq!(body["user"]["role"], "instructor");
}

#[tokio::test]
async fn registration_validates_input_and_rejects_duplicates() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Missing password.
    let res = client
        .post(format!("{}/api/auth/register", srv.base_url))
        .json(&json!({ "name": "Ana", "email": "ana@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "All fields are required");

    // Blank name counts as missing.
    let res = register(&client, &srv.base_url, "   ", "ana@x.com", "pw123", None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Unknown role.
    let res = register(&client, &srv.base_url, "Ana", "ana@x.com", "pw123", Some("superuser")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Admins are provisioned out-of-band, not self-registered.
    let res = register(&client, &srv.base_url, "Ana", "ana@x.com", "pw123", Some("admin")).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = register(&client, &srv.base_url, "Ana", "ana@x.com", "pw123", None).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "User registered successfully");

    let res = register(&client, &srv.base_url, "Other Ana", "ana@x.com", "pw123", None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Email already exists");
}

#[tokio::test]
async fn login_rejects_bad_credentials_without_leaking_which_part_failed() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = register(&client, &srv.base_url, "Ana", "ana@x.com", "pw123", None).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = login(&client, &srv.base_url, "ana@x.com", "wrong").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: Value = res.json().await.unwrap();

    let res = login(&client, &srv.base_url, "nobody@x.com", "pw123").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let unknown_email: Value = res.json().await.unwrap();

    assert_eq!(message(&wrong_password), "Invalid email or password");
    assert_eq!(message(&wrong_password), message(&unknown_email));

    // Missing field is a 400, not a 401.
    let res = client
        .post(format!("{}/api/auth/login", srv.base_url))
        .json(&json!({ "email": "ana@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "All fields required");
}

#[tokio::test]
async fn students_login_immediately_instructors_wait_for_approval() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = register(&client, &srv.base_url, "Ana", "ana@x.com", "pw123", Some("student")).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    login_token(&client, &srv.base_url, "ana@x.com", "pw123").await;

    let res = register(&client, &srv.base_url, "Bo", "bo@x.com", "pw123", Some("instructor")).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = login(&client, &srv.base_url, "bo@x.com", "pw123").await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Instructor not approved yet");

    let admin = srv.token_for(Role::Admin);
    approve_instructor(&client, &srv.base_url, &admin, "bo@x.com").await;
    login_token(&client, &srv.base_url, "bo@x.com", "pw123").await;
}

#[tokio::test]
async fn role_gates_reject_wrong_roles_regardless_of_payload() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let student = srv.token_for(Role::Student);
    let instructor = srv.token_for(Role::Instructor);
    let admin = srv.token_for(Role::Admin);

    let res = client
        .get(format!("{}/api/admin/users", srv.base_url))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");
    assert_eq!(message(&body), "Admin access required");

    // The gate answers before the handler ever validates the body.
    let res = client
        .post(format!("{}/api/instructor/create-course", srv.base_url))
        .bearer_auth(&student)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Instructor access required");

    let res = client
        .get(format!("{}/api/student/courses", srv.base_url))
        .bearer_auth(&instructor)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Student access required");

    let res = client
        .get(format!("{}/api/admin/users", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn instructors_cannot_touch_foreign_courses() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let ira = approved_instructor(&client, &srv, "Ira", "ira@x.com").await;
    let ivo = approved_instructor(&client, &srv, "Ivo", "ivo@x.com").await;
    let course_id = create_course(&client, &srv.base_url, &ira, "Go Basics", 10.0).await;

    let res = client
        .get(format!(
            "{}/api/instructor/course/{course_id}/students",
            srv.base_url
        ))
        .bearer_auth(&ivo)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Unauthorized");

    let res = client
        .delete(format!("{}/api/instructor/course/{course_id}", srv.base_url))
        .bearer_auth(&ivo)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The owner can do both.
    let res = client
        .get(format!(
            "{}/api/instructor/course/{course_id}/students",
            srv.base_url
        ))
        .bearer_auth(&ira)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let roster: Value = res.json().await.unwrap();
    assert_eq!(roster.as_array().unwrap().len(), 0);

    let res = client
        .delete(format!("{}/api/instructor/course/{course_id}", srv.base_url))
        .bearer_auth(&ira)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Course deleted successfully");
}

#[tokio::test]
async fn courses_stay_out_of_the_catalog_until_approved() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let ira = approved_instructor(&client, &srv, "Ira", "ira@x.com").await;
    let course_id = create_course(&client, &srv.base_url, &ira, "Go Basics", 10.0).await;

    let admin = srv.token_for(Role::Admin);
    let pending: Value = client
        .get(format!("{}/api/admin/pending-courses", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(
        pending
            .as_array()
            .unwrap()
            .iter()
            .any(|c| c["id"] == course_id.as_str())
    );

    let res = register(&client, &srv.base_url, "Ana", "ana@x.com", "pw123", None).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let ana = login_token(&client, &srv.base_url, "ana@x.com", "pw123").await;

    let catalog: Value = client
        .get(format!("{}/api/student/courses", srv.base_url))
        .bearer_auth(&ana)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(catalog.as_array().unwrap().is_empty());

    // Approve twice: the second call is a no-op, not an error.
    for _ in 0..2 {
        let res = client
            .put(format!(
                "{}/api/admin/approve-course/{course_id}",
                srv.base_url
            ))
            .bearer_auth(&admin)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(message(&body), "Course approved");
    }

    let catalog: Value = client
        .get(format!("{}/api/student/courses", srv.base_url))
        .bearer_auth(&ana)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rows = catalog.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], course_id.as_str());
    assert_eq!(rows[0]["title"], "Go Basics");
    assert_eq!(rows[0]["instructor"], "Ira");

    // Exactly one row for the course on the admin overview, approved.
    let all: Value = client
        .get(format!("{}/api/admin/courses", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let matching: Vec<&Value> = all
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c["id"] == course_id.as_str())
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0]["approved"], true);
}

#[tokio::test]
async fn rejecting_a_course_cascades_to_enrollments() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let ira = approved_instructor(&client, &srv, "Ira", "ira@x.com").await;
    let course_id = create_course(&client, &srv.base_url, &ira, "Go Basics", 10.0).await;
    let admin = srv.token_for(Role::Admin);
    let res = client
        .put(format!(
            "{}/api/admin/approve-course/{course_id}",
            srv.base_url
        ))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = register(&client, &srv.base_url, "Ana", "ana@x.com", "pw123", None).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let ana = login_token(&client, &srv.base_url, "ana@x.com", "pw123").await;

    let res = client
        .post(format!("{}/api/student/enroll", srv.base_url))
        .bearer_auth(&ana)
        .json(&json!({ "courseId": course_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .delete(format!(
            "{}/api/admin/reject-course/{course_id}",
            srv.base_url
        ))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Course rejected");

    // The enrollment went with the course.
    let mine: Value = client
        .get(format!("{}/api/student/my-courses", srv.base_url))
        .bearer_auth(&ana)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(mine.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn enroll_validates_and_rejects_duplicates() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = register(&client, &srv.base_url, "Ana", "ana@x.com", "pw123", None).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let ana = login_token(&client, &srv.base_url, "ana@x.com", "pw123").await;

    // Missing course id.
    let res = client
        .post(format!("{}/api/student/enroll", srv.base_url))
        .bearer_auth(&ana)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Course ID required");

    // Malformed course id.
    let res = client
        .post(format!("{}/api/student/enroll", srv.base_url))
        .bearer_auth(&ana)
        .json(&json!({ "courseId": "not-a-uuid" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Nonexistent course.
    let res = client
        .post(format!("{}/api/student/enroll", srv.base_url))
        .bearer_auth(&ana)
        .json(&json!({ "courseId": courseforge_core::CourseId::new() }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Course not found");

    // An unapproved course is as invisible as a missing one.
    let ira = approved_instructor(&client, &srv, "Ira", "ira@x.com").await;
    let course_id = create_course(&client, &srv.base_url, &ira, "Draft", 5.0).await;
    let res = client
        .post(format!("{}/api/student/enroll", srv.base_url))
        .bearer_auth(&ana)
        .json(&json!({ "courseId": course_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_manages_users_end_to_end() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = register(&client, &srv.base_url, "Ana", "ana@x.com", "pw123", None).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let res = register(&client, &srv.base_url, "Bea", "bea@x.com", "pw123", None).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let admin = srv.token_for(Role::Admin);
    let users: Value = client
        .get(format!("{}/api/admin/users", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rows = users.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    // Password material never leaves the store.
    for row in rows {
        assert!(row.get("password").is_none());
        assert!(row.get("password_hash").is_none());
    }
    let ana_id = rows
        .iter()
        .find(|u| u["email"] == "ana@x.com")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Rename works; stealing another user's email does not.
    let res = client
        .put(format!("{}/api/admin/user/{ana_id}", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "name": "Ana Maria", "email": "ana@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "User updated successfully");

    let res = client
        .put(format!("{}/api/admin/user/{ana_id}", srv.base_url))
        .bearer_auth(&admin)
        .json(&json!({ "name": "Ana", "email": "bea@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .put(format!("{}/api/admin/user/{}", srv.base_url, UserId::new()))
        .bearer_auth(&admin)
        .json(&json!({ "name": "Ghost", "email": "ghost@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(format!("{}/api/admin/user/{ana_id}", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "User deleted");

    // The deleted account cannot log in any more.
    let res = login(&client, &srv.base_url, "ana@x.com", "pw123").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn approving_unknown_or_malformed_ids_fails_cleanly() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = srv.token_for(Role::Admin);

    let res = client
        .put(format!("{}/api/admin/approve/{}", srv.base_url, UserId::new()))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Instructor not found");

    let res = client
        .put(format!(
            "{}/api/admin/approve-course/{}",
            srv.base_url,
            courseforge_core::CourseId::new()
        ))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Course not found");

    let res = client
        .put(format!("{}/api/admin/approve/not-a-uuid", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    // Approving a student through the instructor endpoint misses too.
    let res = register(&client, &srv.base_url, "Ana", "ana@x.com", "pw123", None).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let users: Value = client
        .get(format!("{}/api/admin/users", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ana_id = users.as_array().unwrap()[0]["id"].as_str().unwrap().to_string();
    let res = client
        .put(format!("{}/api/admin/approve/{ana_id}", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_course_validates_fields_and_price() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let ira = approved_instructor(&client, &srv, "Ira", "ira@x.com").await;

    let res = client
        .post(format!("{}/api/instructor/create-course", srv.base_url))
        .bearer_auth(&ira)
        .json(&json!({ "title": "Go Basics" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Missing required fields");

    let res = client
        .post(format!("{}/api/instructor/create-course", srv.base_url))
        .bearer_auth(&ira)
        .json(&json!({ "title": "Go Basics", "description": "intro", "price": -3.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // A free course is fine.
    let res = client
        .post(format!("{}/api/instructor/create-course", srv.base_url))
        .bearer_auth(&ira)
        .json(&json!({ "title": "Go Basics", "description": "intro", "price": 0.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let mine: Value = client
        .get(format!("{}/api/instructor/my-courses", srv.base_url))
        .bearer_auth(&ira)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rows = mine.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["approved"], false);
    assert_eq!(rows[0]["students"], 0);
}

#[tokio::test]
async fn end_to_end_marketplace_flow() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Ana the student is usable immediately.
    let res = register(&client, &srv.base_url, "Ana", "ana@x.com", "pw123", Some("student")).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let ana = login_token(&client, &srv.base_url, "ana@x.com", "pw123").await;

    // Bo the instructor has to wait for approval.
    let res = register(&client, &srv.base_url, "Bo", "bo@x.com", "pw123", Some("instructor")).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let res = login(&client, &srv.base_url, "bo@x.com", "pw123").await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let admin = srv.token_for(Role::Admin);
    approve_instructor(&client, &srv.base_url, &admin, "bo@x.com").await;
    let bo = login_token(&client, &srv.base_url, "bo@x.com", "pw123").await;

    // Bo authors a course; it waits in the review queue, off the catalog.
    let course_id = create_course(&client, &srv.base_url, &bo, "Go Basics", 10.0).await;

    let pending: Value = client
        .get(format!("{}/api/admin/pending-courses", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(
        pending
            .as_array()
            .unwrap()
            .iter()
            .any(|c| c["id"] == course_id.as_str())
    );

    let catalog: Value = client
        .get(format!("{}/api/student/courses", srv.base_url))
        .bearer_auth(&ana)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(catalog.as_array().unwrap().is_empty());

    let res = client
        .put(format!(
            "{}/api/admin/approve-course/{course_id}",
            srv.base_url
        ))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Ana sees it and enrolls, once.
    let catalog: Value = client
        .get(format!("{}/api/student/courses", srv.base_url))
        .bearer_auth(&ana)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(catalog.as_array().unwrap().len(), 1);

    let res = client
        .post(format!("{}/api/student/enroll", srv.base_url))
        .bearer_auth(&ana)
        .json(&json!({ "courseId": course_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Enrolled successfully");

    let mine: Value = client
        .get(format!("{}/api/student/my-courses", srv.base_url))
        .bearer_auth(&ana)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rows = mine.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "Go Basics");
    assert_eq!(rows[0]["instructor"], "Bo");

    let today: Value = client
        .get(format!("{}/api/student/today-courses", srv.base_url))
        .bearer_auth(&ana)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(today.as_array().unwrap().len(), 1);

    let res = client
        .post(format!("{}/api/student/enroll", srv.base_url))
        .bearer_auth(&ana)
        .json(&json!({ "courseId": course_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(message(&body), "Already enrolled");

    // Bo sees Ana on the roster.
    let roster: Value = client
        .get(format!(
            "{}/api/instructor/course/{course_id}/students",
            srv.base_url
        ))
        .bearer_auth(&bo)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rows = roster.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["email"], "ana@x.com");
}
