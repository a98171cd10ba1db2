//! Handlers for school structure: grades, streams, terms and assessment
//! types.
//!
//! Any staff member may read; only the headteacher may write.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use shule_core::error::CoreError;
use shule_core::school::{education_level_for_grade, validate_education_level, validate_name};
use shule_core::types::DbId;
use shule_db::models::grade::{CreateGrade, CreateStream, Grade, Stream};
use shule_db::models::term::{AssessmentType, CreateAssessmentType, CreateTerm, Term};
use shule_db::repositories::{AssessmentTypeRepo, GradeRepo, StreamRepo, TermRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireHeadteacher, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Grades
// ---------------------------------------------------------------------------

/// POST /api/v1/grades
///
/// `education_level` defaults to the level implied by `grade_number`.
pub async fn create_grade(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Json(input): Json<CreateGrade>,
) -> AppResult<(StatusCode, Json<Grade>)> {
    validate_name(&input.name, "Grade name")?;
    let level = match input.education_level.as_deref() {
        Some(level) => {
            validate_education_level(level)?;
            level
        }
        None => education_level_for_grade(input.grade_number).ok_or_else(|| {
            CoreError::Validation(format!(
                "Cannot infer an education level for grade {}; pass education_level",
                input.grade_number
            ))
        })?,
    };

    let grade = GradeRepo::create(&state.pool, &input, level).await?;
    tracing::info!(grade_id = grade.id, education_level = %grade.education_level, "Grade created");
    Ok((StatusCode::CREATED, Json(grade)))
}

/// GET /api/v1/grades
pub async fn list_grades(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
) -> AppResult<Json<DataResponse<Vec<Grade>>>> {
    let data = GradeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/grades/{id}
pub async fn get_grade(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<Grade>> {
    let grade = find_grade(&state, id).await?;
    Ok(Json(grade))
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

/// POST /api/v1/grades/{grade_id}/streams
pub async fn create_stream(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Path(grade_id): Path<DbId>,
    Json(mut input): Json<CreateStream>,
) -> AppResult<(StatusCode, Json<Stream>)> {
    validate_name(&input.name, "Stream name")?;
    find_grade(&state, grade_id).await?;
    input.grade_id = grade_id;

    let stream = StreamRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(stream)))
}

/// GET /api/v1/grades/{grade_id}/streams
pub async fn list_streams(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(grade_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Stream>>>> {
    find_grade(&state, grade_id).await?;
    let data = StreamRepo::list_by_grade(&state.pool, grade_id).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

/// POST /api/v1/terms
///
/// Creating a term with `is_current = true` clears the flag on every other
/// term.
pub async fn create_term(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Json(input): Json<CreateTerm>,
) -> AppResult<(StatusCode, Json<Term>)> {
    validate_name(&input.name, "Term name")?;
    if !(2000..=2100).contains(&input.academic_year) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Academic year {} is out of range",
            input.academic_year
        ))));
    }
    let term = TermRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(term)))
}

/// GET /api/v1/terms
pub async fn list_terms(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
) -> AppResult<Json<DataResponse<Vec<Term>>>> {
    let data = TermRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/terms/current
pub async fn get_current_term(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
) -> AppResult<Json<Term>> {
    let term = TermRepo::find_current(&state.pool)
        .await?
        .ok_or_else(|| AppError::BadRequest("No term is marked as current".into()))?;
    Ok(Json(term))
}

/// POST /api/v1/terms/{id}/current
pub async fn set_current_term(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Path(id): Path<DbId>,
) -> AppResult<Json<Term>> {
    let term = TermRepo::set_current(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Term", id }))?;
    tracing::info!(term_id = term.id, "Current term changed");
    Ok(Json(term))
}

// ---------------------------------------------------------------------------
// Assessment types
// ---------------------------------------------------------------------------

/// POST /api/v1/assessment-types
pub async fn create_assessment_type(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Json(input): Json<CreateAssessmentType>,
) -> AppResult<(StatusCode, Json<AssessmentType>)> {
    validate_name(&input.name, "Assessment type name")?;
    let assessment_type = AssessmentTypeRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(assessment_type)))
}

/// GET /api/v1/assessment-types
pub async fn list_assessment_types(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
) -> AppResult<Json<DataResponse<Vec<AssessmentType>>>> {
    let data = AssessmentTypeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_grade(state: &AppState, id: DbId) -> AppResult<Grade> {
    GradeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Grade", id }))
}
