//! Handlers for the `/reports` resource: composite percentages, class
//! reports and student report cards.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use shule_core::report::{ClassReport, StudentReportCard};
use shule_core::types::DbId;

use crate::access::{ensure_can_view_student, report_subject_scope};
use crate::cache::{ClassReportKey, CompositeKey};
use crate::error::AppResult;
use crate::handlers::students::find_student;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireStaff;
use crate::query::{parse_id_list, AssessmentParams};
use crate::reporting::{self, CompositeView};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query for `GET /reports/composite`.
#[derive(Debug, Deserialize)]
pub struct CompositeParams {
    pub student_id: DbId,
    pub subject_id: DbId,
    pub term_id: DbId,
    pub assessment_type_id: DbId,
}

/// Query for `GET /reports/class`.
#[derive(Debug, Deserialize)]
pub struct ClassReportParams {
    pub grade_id: DbId,
    pub stream_id: Option<DbId>,
    pub term_id: DbId,
    pub assessment_type_id: DbId,
    /// Comma-separated subject ids, e.g. `1,4,7`.
    pub subject_ids: Option<String>,
}

/// Class report together with the class and sitting it describes.
#[derive(Debug, Serialize)]
pub struct ClassReportResponse<'a> {
    pub grade_id: DbId,
    pub stream_id: Option<DbId>,
    pub term_id: DbId,
    pub assessment_type_id: DbId,
    #[serde(flatten)]
    pub report: &'a ClassReport,
}

/// GET /api/v1/reports/composite?student_id=&subject_id=&term_id=&assessment_type_id=
pub async fn composite(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<CompositeParams>,
) -> AppResult<Json<CompositeView>> {
    let student = find_student(&state.pool, params.student_id).await?;
    ensure_can_view_student(&state.pool, &auth_user, &student).await?;

    let key = CompositeKey {
        student_id: student.id,
        subject_id: params.subject_id,
        term_id: params.term_id,
        assessment_type_id: params.assessment_type_id,
    };
    let view = reporting::get_composite_percentage(&state, key).await?;
    Ok(Json(view))
}

/// GET /api/v1/reports/class?grade_id=&stream_id=&term_id=&assessment_type_id=&subject_ids=
///
/// Subject teachers only see the subjects they teach in the class.
pub async fn class_report(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Query(params): Query<ClassReportParams>,
) -> AppResult<Response> {
    let requested = match params.subject_ids.as_deref() {
        Some(raw) => Some(parse_id_list(raw)?).filter(|ids| !ids.is_empty()),
        None => None,
    };
    let subject_ids = report_subject_scope(
        &state.pool,
        &user,
        params.grade_id,
        params.stream_id,
        requested,
    )
    .await?;

    let key = ClassReportKey {
        grade_id: params.grade_id,
        stream_id: params.stream_id,
        term_id: params.term_id,
        assessment_type_id: params.assessment_type_id,
        subject_ids,
    };
    let report = reporting::get_class_report(&state, key).await?;

    let body = ClassReportResponse {
        grade_id: params.grade_id,
        stream_id: params.stream_id,
        term_id: params.term_id,
        assessment_type_id: params.assessment_type_id,
        report: &report,
    };
    Ok(Json(DataResponse { data: body }).into_response())
}

/// GET /api/v1/reports/student/{id}?term_id=&assessment_type_id=
pub async fn student_report(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Query(sitting): Query<AssessmentParams>,
) -> AppResult<Json<StudentReportCard>> {
    let student = find_student(&state.pool, id).await?;
    ensure_can_view_student(&state.pool, &auth_user, &student).await?;

    let card = reporting::get_student_report(&state, &student, sitting).await?;
    Ok(Json(card))
}
