//! Handlers for the `/students` resource.
//!
//! Enrolment changes (moving class, deactivating) and renames drop every
//! cached report: class membership feeds ranking and class averages, and
//! report rows carry the student's name.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use shule_core::error::CoreError;
use shule_core::school::validate_name;
use shule_core::types::DbId;
use shule_db::models::guardian::GuardianLink;
use shule_db::models::student::{CreateStudent, Student, UpdateStudent};
use shule_db::repositories::{GuardianRepo, StreamRepo, StudentRepo};
use sqlx::PgPool;

use crate::access::ensure_can_view_student;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireHeadteacher, RequireStaff};
use crate::reporting::commit_detached;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query for `GET /students`.
#[derive(Debug, Deserialize)]
pub struct StudentListParams {
    pub grade_id: DbId,
    pub stream_id: Option<DbId>,
}

/// POST /api/v1/students
pub async fn create_student(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Json(input): Json<CreateStudent>,
) -> AppResult<(StatusCode, Json<Student>)> {
    validate_name(&input.admission_number, "Admission number")?;
    validate_name(&input.full_name, "Full name")?;
    ensure_stream_in_grade(&state.pool, input.grade_id, input.stream_id).await?;

    let task_state = state.clone();
    let student = commit_detached(async move {
        let student = StudentRepo::create(&task_state.pool, &input).await?;
        task_state.report_cache.invalidate_all().await;
        Ok(student)
    })
    .await?;

    tracing::info!(
        student_id = student.id,
        grade_id = student.grade_id,
        stream_id = student.stream_id,
        "Student enrolled"
    );
    Ok((StatusCode::CREATED, Json(student)))
}

/// GET /api/v1/students?grade_id=&stream_id=
///
/// Active students of a class, by admission number.
pub async fn list_students(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Query(params): Query<StudentListParams>,
) -> AppResult<Json<DataResponse<Vec<Student>>>> {
    let data = StudentRepo::list_by_class(&state.pool, params.grade_id, params.stream_id).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/students/{id}
pub async fn get_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Student>> {
    let student = find_student(&state.pool, id).await?;
    ensure_can_view_student(&state.pool, &auth_user, &student).await?;
    Ok(Json(student))
}

/// PUT /api/v1/students/{id}
pub async fn update_student(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStudent>,
) -> AppResult<Json<Student>> {
    if let Some(name) = &input.full_name {
        validate_name(name, "Full name")?;
    }
    let current = find_student(&state.pool, id).await?;

    let moves_class = input.grade_id.is_some_and(|g| g != current.grade_id)
        || input.stream_id.is_some_and(|s| s != current.stream_id);
    if moves_class {
        ensure_stream_in_grade(
            &state.pool,
            input.grade_id.unwrap_or(current.grade_id),
            input.stream_id.unwrap_or(current.stream_id),
        )
        .await?;
    }

    let was_active = current.is_active;
    let previous_name = current.full_name;
    let task_state = state.clone();
    let student = commit_detached(async move {
        let student = StudentRepo::update(&task_state.pool, id, &input)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound { entity: "Student", id }))?;
        // Report rows carry the name, so a rename is as stale as a move.
        if moves_class
            || student.is_active != was_active
            || student.full_name != previous_name
        {
            task_state.report_cache.invalidate_all().await;
        }
        Ok(student)
    })
    .await?;

    if moves_class || student.is_active != was_active {
        tracing::info!(
            student_id = id,
            grade_id = student.grade_id,
            stream_id = student.stream_id,
            is_active = student.is_active,
            "Student enrolment changed"
        );
    }
    Ok(Json(student))
}

/// GET /api/v1/students/{id}/guardians
pub async fn list_guardians(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<GuardianLink>>>> {
    find_student(&state.pool, id).await?;
    let data = GuardianRepo::list_for_student(&state.pool, id).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_student(pool: &PgPool, id: DbId) -> AppResult<Student> {
    StudentRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Student", id }))
}

async fn ensure_stream_in_grade(pool: &PgPool, grade_id: DbId, stream_id: DbId) -> AppResult<()> {
    let stream = StreamRepo::find_by_id(pool, stream_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Stream",
            id: stream_id,
        }))?;
    if stream.grade_id != grade_id {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Stream {} does not belong to grade {grade_id}",
            stream.name
        ))));
    }
    Ok(())
}
