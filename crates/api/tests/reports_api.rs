//! HTTP-level tests for composite percentages, class reports, report cards
//! and the parent portal.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    assign, component_id, create_atomic_subject, create_english, create_user, enrol,
    expect_status, get_auth, headteacher, post_json_auth, put_json_auth, seed_class, token_for,
    Class, ROLE_ID_PARENT, ROLE_ID_TEACHER,
};
use serde_json::{json, Value};
use shule_api::cache::ReportCache;
use shule_db::models::guardian::CreateGuardianLink;
use shule_db::models::student::Student;
use shule_db::models::subject::SubjectWithComponents;
use shule_db::repositories::GuardianRepo;
use sqlx::PgPool;

/// Upload both English component marks for `student` as the headteacher.
async fn upload_english(
    pool: &PgPool,
    token: &str,
    class: &Class,
    english: &SubjectWithComponents,
    student: &Student,
    grammar: f64,
    composition: f64,
) {
    let app = common::build_test_app(pool.clone());
    let body = json!({
        "term_id": class.term_id,
        "assessment_type_id": class.assessment_type_id,
        "marks": [
            { "student_id": student.id, "component_id": component_id(english, "Grammar"), "raw_mark": grammar },
            { "student_id": student.id, "component_id": component_id(english, "Composition"), "raw_mark": composition },
        ],
    });
    let response = post_json_auth(app, "/api/v1/marks/bulk", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

fn class_report_uri(class: &Class) -> String {
    format!(
        "/api/v1/reports/class?grade_id={}&stream_id={}&term_id={}&assessment_type_id={}",
        class.grade_id, class.stream_id, class.term_id, class.assessment_type_id
    )
}

fn student_row<'a>(report: &'a Value, student: &Student) -> &'a Value {
    report["data"]["students"]
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["student_id"] == student.id)
        .expect("student should be in the report")
}

// ---------------------------------------------------------------------------
// Class report
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn grade_8_english_class_report(pool: PgPool) {
    let (_head, token) = headteacher(&pool).await;
    let class = seed_class(&pool).await;
    let english = create_english(&pool).await;
    let a = enrol(&pool, &class, "ADM001", "Amani Kiptoo").await;
    let b = enrol(&pool, &class, "ADM002", "Baraka Mwangi").await;

    upload_english(&pool, &token, &class, &english, &a, 57.0, 35.0).await;
    upload_english(&pool, &token, &class, &english, &b, 45.0, 20.0).await;

    let app = common::build_test_app(pool);
    let report = expect_status(
        get_auth(app, &class_report_uri(&class), &token).await,
        StatusCode::OK,
    )
    .await;
    let data = &report["data"];

    assert_eq!(data["grade_id"], class.grade_id);
    assert_eq!(data["stream_id"], class.stream_id);
    assert_eq!(data["is_empty"], false);
    assert_eq!(data["student_count"], 2);
    assert_eq!(data["class_average"], 78.5);
    assert_eq!(data["subjects"][0]["name"], "English");
    assert_eq!(data["subjects"][0]["average"], 78.5);

    let row_a = student_row(&report, &a);
    assert_eq!(row_a["rank"], 1);
    assert_eq!(row_a["subjects"][0]["percentage"], 92.0);
    assert_eq!(row_a["subjects"][0]["category"]["code"], "EE1");
    assert_eq!(row_a["subjects"][0]["is_complete"], true);
    assert_eq!(row_a["subjects"][0]["components"][0]["name"], "Grammar");
    assert_eq!(row_a["subjects"][0]["components"][0]["contribution"], 57.0);

    let row_b = student_row(&report, &b);
    assert_eq!(row_b["rank"], 2);
    assert_eq!(row_b["subjects"][0]["percentage"], 65.0);
    assert_eq!(row_b["subjects"][0]["category"]["code"], "ME1");

    // Rank order.
    assert_eq!(data["students"][0]["student_id"], a.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn students_without_marks_are_unranked(pool: PgPool) {
    let (_head, token) = headteacher(&pool).await;
    let class = seed_class(&pool).await;
    let english = create_english(&pool).await;
    let a = enrol(&pool, &class, "ADM001", "Amani Kiptoo").await;
    let absent = enrol(&pool, &class, "ADM000", "Absent Student").await;

    upload_english(&pool, &token, &class, &english, &a, 30.0, 20.0).await;

    let app = common::build_test_app(pool);
    let report = expect_status(
        get_auth(app, &class_report_uri(&class), &token).await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(report["data"]["ranked_count"], 1);
    assert_eq!(report["data"]["class_average"], 50.0);
    assert!(student_row(&report, &absent)["rank"].is_null());
    assert_eq!(report["data"]["students"][1]["student_id"], absent.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_class_report(pool: PgPool) {
    let (_head, token) = headteacher(&pool).await;
    let class = seed_class(&pool).await;
    create_english(&pool).await;

    let app = common::build_test_app(pool);
    let report = expect_status(
        get_auth(app, &class_report_uri(&class), &token).await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(report["data"]["is_empty"], true);
    assert_eq!(report["data"]["student_count"], 0);
    assert!(report["data"]["class_average"].is_null());
    assert!(report["data"]["students"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn class_report_reflects_reuploaded_marks(pool: PgPool) {
    let (_head, token) = headteacher(&pool).await;
    let class = seed_class(&pool).await;
    let english = create_english(&pool).await;
    let a = enrol(&pool, &class, "ADM001", "Amani Kiptoo").await;
    let cache = Arc::new(ReportCache::new());

    let upload = |grammar: f64| {
        let app = common::build_test_app_with_cache(pool.clone(), Arc::clone(&cache));
        let body = json!({
            "student_id": a.id,
            "component_id": component_id(&english, "Grammar"),
            "term_id": class.term_id,
            "assessment_type_id": class.assessment_type_id,
            "raw_mark": grammar,
        });
        let token = token.clone();
        async move { post_json_auth(app, "/api/v1/marks/component", body, &token).await }
    };

    assert_eq!(upload(30.0).await.status(), StatusCode::CREATED);

    let app = common::build_test_app_with_cache(pool.clone(), Arc::clone(&cache));
    let first = expect_status(get_auth(app, &class_report_uri(&class), &token).await, StatusCode::OK).await;
    assert_eq!(student_row(&first, &a)["subjects"][0]["percentage"], 30.0);
    assert!(!cache.is_empty().await);

    assert_eq!(upload(60.0).await.status(), StatusCode::CREATED);

    let app = common::build_test_app_with_cache(pool, Arc::clone(&cache));
    let second = expect_status(get_auth(app, &class_report_uri(&class), &token).await, StatusCode::OK).await;
    assert_eq!(student_row(&second, &a)["subjects"][0]["percentage"], 60.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn class_report_shows_renamed_student(pool: PgPool) {
    let (_head, token) = headteacher(&pool).await;
    let class = seed_class(&pool).await;
    let english = create_english(&pool).await;
    let a = enrol(&pool, &class, "ADM001", "Amani Kiptoo").await;
    upload_english(&pool, &token, &class, &english, &a, 45.0, 30.0).await;
    let cache = Arc::new(ReportCache::new());

    let app = common::build_test_app_with_cache(pool.clone(), Arc::clone(&cache));
    let first = expect_status(get_auth(app, &class_report_uri(&class), &token).await, StatusCode::OK).await;
    assert_eq!(student_row(&first, &a)["full_name"], "Amani Kiptoo");
    assert!(!cache.is_empty().await);

    let app = common::build_test_app_with_cache(pool.clone(), Arc::clone(&cache));
    let uri = format!("/api/v1/students/{}", a.id);
    let response = put_json_auth(app, &uri, json!({ "full_name": "Amani Chebet" }), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(cache.is_empty().await);

    let app = common::build_test_app_with_cache(pool, Arc::clone(&cache));
    let second = expect_status(get_auth(app, &class_report_uri(&class), &token).await, StatusCode::OK).await;
    assert_eq!(student_row(&second, &a)["full_name"], "Amani Chebet");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn subject_teacher_sees_only_own_subjects(pool: PgPool) {
    let (_head, head_token) = headteacher(&pool).await;
    let class = seed_class(&pool).await;
    let english = create_english(&pool).await;
    let maths = create_atomic_subject(&pool, "Mathematics", 2).await;
    let a = enrol(&pool, &class, "ADM001", "Amani Kiptoo").await;
    upload_english(&pool, &head_token, &class, &english, &a, 57.0, 35.0).await;

    let teacher = create_user(&pool, "maths-teacher", ROLE_ID_TEACHER).await;
    assign(&pool, &teacher, &class, Some(maths)).await;
    let token = token_for(&teacher, "teacher");

    let app = common::build_test_app(pool.clone());
    let report = expect_status(get_auth(app, &class_report_uri(&class), &token).await, StatusCode::OK).await;
    let subjects = report["data"]["subjects"].as_array().unwrap();
    assert_eq!(subjects.len(), 1);
    assert_eq!(subjects[0]["subject_id"], maths);

    let app = common::build_test_app(pool);
    let uri = format!("{}&subject_ids={}", class_report_uri(&class), english.subject.id);
    let response = get_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn whole_grade_report_is_headteacher_only(pool: PgPool) {
    let (_head, head_token) = headteacher(&pool).await;
    let class = seed_class(&pool).await;
    let maths = create_atomic_subject(&pool, "Mathematics", 2).await;
    let west = common::Class {
        stream_id: common::add_stream(&pool, class.grade_id, "West").await,
        ..class
    };
    let pupil = enrol(&pool, &west, "ADM009", "West Pupil").await;

    let app = common::build_test_app(pool.clone());
    let body = json!({
        "student_id": pupil.id,
        "subject_id": maths,
        "term_id": class.term_id,
        "assessment_type_id": class.assessment_type_id,
        "raw_mark": 77.0,
        "total_possible": 100.0,
    });
    let response = post_json_auth(app, "/api/v1/marks/subject", body, &head_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let teacher = create_user(&pool, "east-maths", ROLE_ID_TEACHER).await;
    assign(&pool, &teacher, &class, Some(maths)).await;
    let token = token_for(&teacher, "teacher");
    let uri = format!(
        "/api/v1/reports/class?grade_id={}&term_id={}&assessment_type_id={}",
        class.grade_id, class.term_id, class.assessment_type_id
    );

    let app = common::build_test_app(pool.clone());
    let json = expect_status(get_auth(app, &uri, &token).await, StatusCode::FORBIDDEN).await;
    assert!(json.get("data").is_none());

    let app = common::build_test_app(pool);
    let report = expect_status(get_auth(app, &uri, &head_token).await, StatusCode::OK).await;
    assert_eq!(student_row(&report, &pupil)["rank"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_subject_filter_is_rejected(pool: PgPool) {
    let (_head, token) = headteacher(&pool).await;
    let class = seed_class(&pool).await;

    let app = common::build_test_app(pool);
    let uri = format!("{}&subject_ids=1,abc", class_report_uri(&class));
    let response = get_auth(app, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Composite percentage
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn partial_composite_counts_missing_component_as_zero(pool: PgPool) {
    let (_head, token) = headteacher(&pool).await;
    let class = seed_class(&pool).await;
    let english = create_english(&pool).await;
    let a = enrol(&pool, &class, "ADM001", "Amani Kiptoo").await;

    let app = common::build_test_app(pool.clone());
    let body = json!({
        "student_id": a.id,
        "component_id": component_id(&english, "Grammar"),
        "term_id": class.term_id,
        "assessment_type_id": class.assessment_type_id,
        "raw_mark": 48.0,
    });
    let response = post_json_auth(app, "/api/v1/marks/component", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let uri = format!(
        "/api/v1/reports/composite?student_id={}&subject_id={}&term_id={}&assessment_type_id={}",
        a.id, english.subject.id, class.term_id, class.assessment_type_id
    );
    let json = expect_status(get_auth(app, &uri, &token).await, StatusCode::OK).await;

    assert_eq!(json["percentage"], 48.0);
    assert_eq!(json["is_complete"], false);
    assert_eq!(json["components_entered"], 1);
    assert_eq!(json["components_total"], 2);
    assert_eq!(json["category"]["code"], "ME2");
    assert!(json["breakdown"][1]["raw_mark"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn composite_without_marks_has_no_percentage(pool: PgPool) {
    let (_head, token) = headteacher(&pool).await;
    let class = seed_class(&pool).await;
    let english = create_english(&pool).await;
    let a = enrol(&pool, &class, "ADM001", "Amani Kiptoo").await;

    let app = common::build_test_app(pool);
    let uri = format!(
        "/api/v1/reports/composite?student_id={}&subject_id={}&term_id={}&assessment_type_id={}",
        a.id, english.subject.id, class.term_id, class.assessment_type_id
    );
    let json = expect_status(get_auth(app, &uri, &token).await, StatusCode::OK).await;

    assert!(json["percentage"].is_null());
    assert!(json["category"].is_null());
    assert_eq!(json["components_entered"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn composite_for_unknown_term_is_not_found(pool: PgPool) {
    let (_head, token) = headteacher(&pool).await;
    let class = seed_class(&pool).await;
    let english = create_english(&pool).await;
    let a = enrol(&pool, &class, "ADM001", "Amani Kiptoo").await;
    let cache = Arc::new(ReportCache::new());

    let app = common::build_test_app_with_cache(pool, Arc::clone(&cache));
    let uri = format!(
        "/api/v1/reports/composite?student_id={}&subject_id={}&term_id={}&assessment_type_id={}",
        a.id,
        english.subject.id,
        class.term_id + 999,
        class.assessment_type_id
    );
    let json = expect_status(get_auth(app, &uri, &token).await, StatusCode::NOT_FOUND).await;

    assert_eq!(json["code"], "NOT_FOUND");
    assert!(cache.is_empty().await);
}

// ---------------------------------------------------------------------------
// Component configuration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn weights_must_sum_to_one(pool: PgPool) {
    let (_head, token) = headteacher(&pool).await;
    let english = create_english(&pool).await;

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/subjects/{}/components", english.subject.id);
    let body = json!({
        "components": [
            { "name": "Grammar", "weight": 0.6, "max_raw_mark": 60.0 },
            { "name": "Composition", "weight": 0.5, "max_raw_mark": 40.0 },
        ],
    });
    let json = expect_status(
        put_json_auth(app, &uri, body, &token).await,
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await;
    assert!(json["error"].as_str().unwrap().contains("sum to 1.0"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn changing_component_maximum_keeps_existing_scores(pool: PgPool) {
    let (_head, token) = headteacher(&pool).await;
    let class = seed_class(&pool).await;
    let english = create_english(&pool).await;
    let a = enrol(&pool, &class, "ADM001", "Amani Kiptoo").await;

    let app = common::build_test_app(pool.clone());
    let body = json!({
        "student_id": a.id,
        "component_id": component_id(&english, "Grammar"),
        "term_id": class.term_id,
        "assessment_type_id": class.assessment_type_id,
        "raw_mark": 54.0,
    });
    let response = post_json_auth(app, "/api/v1/marks/component", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/subjects/{}/components", english.subject.id);
    let body = json!({
        "components": [
            { "name": "Grammar", "weight": 0.6, "max_raw_mark": 30.0 },
            { "name": "Composition", "weight": 0.4, "max_raw_mark": 40.0 },
        ],
    });
    let response = put_json_auth(app, &uri, body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let uri = format!(
        "/api/v1/reports/composite?student_id={}&subject_id={}&term_id={}&assessment_type_id={}",
        a.id, english.subject.id, class.term_id, class.assessment_type_id
    );
    let json = expect_status(get_auth(app, &uri, &token).await, StatusCode::OK).await;

    // 54/60 is 90%, and stays 90% (27/30) under the new maximum.
    assert_eq!(json["breakdown"][0]["raw_mark"], 27.0);
    assert_eq!(json["breakdown"][0]["max_raw_mark"], 30.0);
    assert_eq!(json["breakdown"][0]["contribution"], 54.0);
    assert_eq!(json["percentage"], 54.0);
    assert_eq!(json["is_complete"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn composite_subject_needs_components(pool: PgPool) {
    let (_head, token) = headteacher(&pool).await;

    let app = common::build_test_app(pool.clone());
    let body = json!({
        "name": "Kiswahili",
        "education_level": "junior_secondary",
        "is_composite": true,
    });
    let response = post_json_auth(app, "/api/v1/subjects", body, &token).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let app = common::build_test_app(pool);
    let body = json!({
        "name": "Kiswahili",
        "education_level": "junior_secondary",
        "is_composite": true,
        "components": [
            { "name": "Lugha", "weight": 0.5, "max_raw_mark": 50.0 },
            { "name": "Insha", "weight": 0.5, "max_raw_mark": 50.0 },
        ],
    });
    let json = expect_status(
        post_json_auth(app, "/api/v1/subjects", body, &token).await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(json["components"].as_array().unwrap().len(), 2);
}

// ---------------------------------------------------------------------------
// Report cards and the parent portal
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn linked_parent_reads_child_report(pool: PgPool) {
    let (_head, token) = headteacher(&pool).await;
    let class = seed_class(&pool).await;
    let english = create_english(&pool).await;
    let a = enrol(&pool, &class, "ADM001", "Amani Kiptoo").await;
    let b = enrol(&pool, &class, "ADM002", "Baraka Mwangi").await;
    upload_english(&pool, &token, &class, &english, &a, 57.0, 35.0).await;
    upload_english(&pool, &token, &class, &english, &b, 45.0, 20.0).await;

    let parent = create_user(&pool, "mama-baraka", ROLE_ID_PARENT).await;
    GuardianRepo::create(
        &pool,
        &CreateGuardianLink {
            parent_user_id: parent.id,
            student_id: b.id,
            relationship: Some("mother".to_string()),
        },
    )
    .await
    .unwrap();
    let parent_token = token_for(&parent, "parent");
    let query = format!(
        "term_id={}&assessment_type_id={}",
        class.term_id, class.assessment_type_id
    );

    let app = common::build_test_app(pool.clone());
    let children = expect_status(
        get_auth(app, "/api/v1/portal/children", &parent_token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(children["data"].as_array().unwrap().len(), 1);
    assert_eq!(children["data"][0]["id"], b.id);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/portal/children/{}/report?{query}", b.id);
    let card = expect_status(get_auth(app, &uri, &parent_token).await, StatusCode::OK).await;
    assert_eq!(card["student_id"], b.id);
    assert_eq!(card["rank"], 2);
    assert_eq!(card["class_size"], 2);
    assert_eq!(card["class_average"], 78.5);

    let app = common::build_test_app(pool.clone());
    let uri = format!("/api/v1/portal/children/{}/report?{query}", a.id);
    let response = get_auth(app, &uri, &parent_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/reports/student/{}?{query}", a.id);
    let response = get_auth(app, &uri, &parent_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn staff_cannot_use_parent_portal(pool: PgPool) {
    let (_head, token) = headteacher(&pool).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/portal/children", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
