//! Handlers for the `/marks` resource.
//!
//! Validation, authorization and cache invalidation happen in
//! [`crate::reporting`]; these handlers only shape the HTTP exchange.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use shule_core::types::DbId;
use shule_db::models::mark::Mark;
use shule_db::repositories::MarkRepo;

use crate::access::ensure_can_view_student;
use crate::error::AppResult;
use crate::handlers::students::find_student;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::reporting::{self, BulkMarksInput, ComponentMarkInput, SubjectMarkInput};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query for `GET /marks`.
#[derive(Debug, Deserialize)]
pub struct StudentMarksParams {
    pub student_id: DbId,
    pub term_id: DbId,
    pub assessment_type_id: DbId,
}

/// POST /api/v1/marks/component
///
/// Record (or supersede) one component mark of a composite subject.
pub async fn upload_component_mark(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<ComponentMarkInput>,
) -> AppResult<(StatusCode, Json<Mark>)> {
    let mark = reporting::upload_component_mark(&state, &user, &input).await?;
    Ok((StatusCode::CREATED, Json(mark)))
}

/// POST /api/v1/marks/subject
///
/// Record (or supersede) the mark of an atomic subject.
pub async fn upload_subject_mark(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<SubjectMarkInput>,
) -> AppResult<(StatusCode, Json<Mark>)> {
    let mark = reporting::upload_subject_mark(&state, &user, &input).await?;
    Ok((StatusCode::CREATED, Json(mark)))
}

/// POST /api/v1/marks/bulk
///
/// All-or-nothing: one invalid entry rejects the whole upload.
pub async fn upload_bulk(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Json(input): Json<BulkMarksInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<Mark>>>)> {
    let data = reporting::upload_bulk(&state, &user, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/marks?student_id=&term_id=&assessment_type_id=
pub async fn list_student_marks(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<StudentMarksParams>,
) -> AppResult<Json<DataResponse<Vec<Mark>>>> {
    let student = find_student(&state.pool, params.student_id).await?;
    ensure_can_view_student(&state.pool, &auth_user, &student).await?;

    let data = MarkRepo::list_for_student(
        &state.pool,
        student.id,
        params.term_id,
        params.assessment_type_id,
    )
    .await?;
    Ok(Json(DataResponse { data }))
}
