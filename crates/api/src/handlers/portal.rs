//! Parent portal: a parent sees only the students linked to their account.

use axum::extract::{Path, Query, State};
use axum::Json;
use shule_core::error::CoreError;
use shule_core::report::StudentReportCard;
use shule_core::types::DbId;
use shule_db::models::student::Student;
use shule_db::repositories::GuardianRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::students::find_student;
use crate::middleware::rbac::RequireParent;
use crate::query::AssessmentParams;
use crate::reporting;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/portal/children
pub async fn list_children(
    State(state): State<AppState>,
    RequireParent(parent): RequireParent,
) -> AppResult<Json<DataResponse<Vec<Student>>>> {
    let data = GuardianRepo::list_students_for_parent(&state.pool, parent.user_id).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/portal/children/{id}/report?term_id=&assessment_type_id=
pub async fn child_report(
    State(state): State<AppState>,
    RequireParent(parent): RequireParent,
    Path(id): Path<DbId>,
    Query(sitting): Query<AssessmentParams>,
) -> AppResult<Json<StudentReportCard>> {
    if !GuardianRepo::is_linked(&state.pool, parent.user_id, id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "Student is not linked to your account".into(),
        )));
    }
    let student = find_student(&state.pool, id).await?;
    let card = reporting::get_student_report(&state, &student, sitting).await?;
    Ok(Json(card))
}
