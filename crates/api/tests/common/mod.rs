#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use shule_api::auth::jwt::{generate_access_token, JwtConfig};
use shule_api::auth::password::hash_password;
use shule_api::cache::ReportCache;
use shule_api::config::ServerConfig;
use shule_api::router::build_app_router;
use shule_api::state::AppState;
use shule_core::composite::ComponentDef;
use shule_core::performance::PerformanceScale;
use shule_core::types::DbId;
use shule_db::models::grade::{CreateGrade, CreateStream};
use shule_db::models::student::{CreateStudent, Student};
use shule_db::models::subject::{CreateSubject, SubjectWithComponents};
use shule_db::models::teacher_assignment::CreateTeacherAssignment;
use shule_db::models::term::CreateTerm;
use shule_db::models::user::{CreateUser, User};
use shule_db::repositories::{
    ComponentRepo, GradeRepo, StreamRepo, StudentRepo, SubjectRepo, TeacherAssignmentRepo,
    TermRepo, UserRepo,
};
use sqlx::PgPool;
use tower::ServiceExt;

pub const ROLE_ID_HEADTEACHER: DbId = 1;
pub const ROLE_ID_CLASSTEACHER: DbId = 2;
pub const ROLE_ID_TEACHER: DbId = 3;
pub const ROLE_ID_PARENT: DbId = 4;

pub const TEST_PASSWORD: &str = "test_password_123!";

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Test configuration with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        max_bulk_marks: 50,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the application router exactly as `main.rs` does, over `pool`.
///
/// Each call gets a fresh report cache.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_cache(pool, Arc::new(ReportCache::new()))
}

/// Like [`build_test_app`] but sharing `cache`, so several requests can be
/// issued against the same cached state.
pub fn build_test_app_with_cache(pool: PgPool, cache: Arc<ReportCache>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        report_cache: cache,
        scale: Arc::new(PerformanceScale::default()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should not fail")
}

fn json_request(method: &str, uri: &str, body: serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request("POST", uri, body, None)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request("POST", uri, body, Some(token))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request("PUT", uri, body, Some(token))).await
}

/// Assert the status, printing the body on mismatch.
pub async fn expect_status(response: Response, status: StatusCode) -> serde_json::Value {
    let actual = response.status();
    let json = body_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {json}");
    json
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, username: &str, role_id: DbId) -> User {
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@school.test"),
        full_name: format!("{username} Test"),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role_id,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Mint an access token without going through `/auth/login`.
pub fn token_for(user: &User, role: &str) -> String {
    generate_access_token(user.id, role, &test_config().jwt).expect("token should sign")
}

/// A headteacher account and its token.
pub async fn headteacher(pool: &PgPool) -> (User, String) {
    let user = create_user(pool, "head", ROLE_ID_HEADTEACHER).await;
    let token = token_for(&user, "headteacher");
    (user, token)
}

/// One Grade 8 stream with a current term, using the seeded "End Term"
/// assessment type.
pub struct Class {
    pub grade_id: DbId,
    pub stream_id: DbId,
    pub term_id: DbId,
    pub assessment_type_id: DbId,
}

pub async fn seed_class(pool: &PgPool) -> Class {
    let grade = GradeRepo::create(
        pool,
        &CreateGrade {
            name: "Grade 8".to_string(),
            grade_number: 8,
            education_level: None,
        },
        "junior_secondary",
    )
    .await
    .unwrap();
    let stream = add_stream(pool, grade.id, "East").await;
    let term = TermRepo::create(
        pool,
        &CreateTerm {
            name: "Term 1".to_string(),
            academic_year: 2026,
            is_current: true,
        },
    )
    .await
    .unwrap();
    let (assessment_type_id,): (DbId,) =
        sqlx::query_as("SELECT id FROM assessment_types WHERE name = 'End Term'")
            .fetch_one(pool)
            .await
            .unwrap();

    Class {
        grade_id: grade.id,
        stream_id: stream,
        term_id: term.id,
        assessment_type_id,
    }
}

pub async fn add_stream(pool: &PgPool, grade_id: DbId, name: &str) -> DbId {
    StreamRepo::create(
        pool,
        &CreateStream {
            grade_id,
            name: name.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn enrol(pool: &PgPool, class: &Class, admission_number: &str, name: &str) -> Student {
    StudentRepo::create(
        pool,
        &CreateStudent {
            admission_number: admission_number.to_string(),
            full_name: name.to_string(),
            grade_id: class.grade_id,
            stream_id: class.stream_id,
        },
    )
    .await
    .unwrap()
}

/// English = Grammar (weight 0.6, out of 60) + Composition (0.4, out of 40).
pub async fn create_english(pool: &PgPool) -> SubjectWithComponents {
    let subject = SubjectRepo::create(
        pool,
        &CreateSubject {
            name: "English".to_string(),
            education_level: "junior_secondary".to_string(),
            is_composite: true,
            sort_order: Some(1),
        },
    )
    .await
    .unwrap();
    ComponentRepo::replace_for_subject(
        pool,
        subject.id,
        &[
            ComponentDef::new("Grammar", 0.6, 60.0),
            ComponentDef::new("Composition", 0.4, 40.0),
        ],
    )
    .await
    .unwrap();
    SubjectRepo::find_with_components(pool, subject.id)
        .await
        .unwrap()
        .unwrap()
}

pub async fn create_atomic_subject(pool: &PgPool, name: &str, sort_order: i32) -> DbId {
    SubjectRepo::create(
        pool,
        &CreateSubject {
            name: name.to_string(),
            education_level: "junior_secondary".to_string(),
            is_composite: false,
            sort_order: Some(sort_order),
        },
    )
    .await
    .unwrap()
    .id
}

/// Id of the named component of `subject`.
pub fn component_id(subject: &SubjectWithComponents, name: &str) -> DbId {
    subject
        .components
        .iter()
        .find(|c| c.name == name)
        .map(|c| c.id)
        .expect("component should exist")
}

pub async fn assign(pool: &PgPool, user: &User, class: &Class, subject_id: Option<DbId>) {
    TeacherAssignmentRepo::create(
        pool,
        &CreateTeacherAssignment {
            user_id: user.id,
            grade_id: class.grade_id,
            stream_id: class.stream_id,
            subject_id,
        },
    )
    .await
    .unwrap();
}
