//! Handlers for the `/subjects` resource and composite component
//! definitions.
//!
//! Component sets are validated in `shule_core` before anything is written
//! and replaced in a single transaction, so a composite subject is never
//! seen with a partial set. Any component change drops cached reports.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use shule_core::composite::{validate_components, ComponentDef};
use shule_core::error::CoreError;
use shule_core::school::{validate_education_level, validate_name};
use shule_core::types::DbId;
use shule_db::models::subject::{
    CreateSubject, Subject, SubjectComponent, SubjectWithComponents, UpdateSubject,
};
use shule_db::repositories::{ComponentRepo, SubjectRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireHeadteacher, RequireStaff};
use crate::reporting::commit_detached;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /subjects`.
#[derive(Debug, Deserialize)]
pub struct CreateSubjectRequest {
    #[serde(flatten)]
    pub subject: CreateSubject,
    /// Required when `is_composite` is true, rejected otherwise.
    pub components: Option<Vec<ComponentDef>>,
}

/// Request body for `PUT /subjects/{id}/components`.
#[derive(Debug, Deserialize)]
pub struct ReplaceComponentsRequest {
    pub components: Vec<ComponentDef>,
}

/// Query for `GET /subjects`.
#[derive(Debug, Deserialize)]
pub struct SubjectListParams {
    pub education_level: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

// ---------------------------------------------------------------------------
// Subjects
// ---------------------------------------------------------------------------

/// POST /api/v1/subjects
pub async fn create_subject(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Json(input): Json<CreateSubjectRequest>,
) -> AppResult<(StatusCode, Json<SubjectWithComponents>)> {
    validate_name(&input.subject.name, "Subject name")?;
    validate_education_level(&input.subject.education_level)?;

    match (input.subject.is_composite, &input.components) {
        (true, Some(components)) => validate_components(components)?,
        (true, None) => {
            return Err(AppError::Core(CoreError::InvalidComponentConfiguration(
                "A composite subject needs at least one component".into(),
            )))
        }
        (false, Some(_)) => {
            return Err(AppError::Core(CoreError::Validation(
                "Components can only be defined for a composite subject".into(),
            )))
        }
        (false, None) => {}
    }

    let task_state = state.clone();
    let (subject, components) = commit_detached(async move {
        let subject = SubjectRepo::create(&task_state.pool, &input.subject).await?;
        let components = match &input.components {
            Some(defs) => {
                ComponentRepo::replace_for_subject(&task_state.pool, subject.id, defs).await?
            }
            None => Vec::new(),
        };
        // A new active subject adds a column to class reports.
        task_state.report_cache.invalidate_all().await;
        Ok((subject, components))
    })
    .await?;

    tracing::info!(
        subject_id = subject.id,
        is_composite = subject.is_composite,
        components = components.len(),
        "Subject created"
    );
    Ok((
        StatusCode::CREATED,
        Json(SubjectWithComponents {
            subject,
            components,
        }),
    ))
}

/// GET /api/v1/subjects?education_level=&include_inactive=
pub async fn list_subjects(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Query(params): Query<SubjectListParams>,
) -> AppResult<Json<DataResponse<Vec<Subject>>>> {
    if let Some(level) = &params.education_level {
        validate_education_level(level)?;
    }
    let data = SubjectRepo::list(
        &state.pool,
        params.education_level.as_deref(),
        params.include_inactive,
    )
    .await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/subjects/{id}
pub async fn get_subject(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<SubjectWithComponents>> {
    let subject = SubjectRepo::find_with_components(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Subject", id }))?;
    Ok(Json(subject))
}

/// PUT /api/v1/subjects/{id}
///
/// Subject names and active flags feed reports, so every update drops
/// cached reports.
pub async fn update_subject(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSubject>,
) -> AppResult<Json<Subject>> {
    if let Some(name) = &input.name {
        validate_name(name, "Subject name")?;
    }
    let task_state = state.clone();
    let subject = commit_detached(async move {
        let subject = SubjectRepo::update(&task_state.pool, id, &input)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound { entity: "Subject", id }))?;
        task_state.report_cache.invalidate_all().await;
        Ok(subject)
    })
    .await?;
    Ok(Json(subject))
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// GET /api/v1/subjects/{id}/components
pub async fn list_components(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<SubjectComponent>>>> {
    find_subject(&state, id).await?;
    let data = ComponentRepo::list_for_subject(&state.pool, id).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/subjects/{id}/components
///
/// Replace the whole component set. Components are matched by name, so
/// marks of a component that keeps its name survive a weight change.
pub async fn replace_components(
    State(state): State<AppState>,
    RequireHeadteacher(admin): RequireHeadteacher,
    Path(id): Path<DbId>,
    Json(input): Json<ReplaceComponentsRequest>,
) -> AppResult<Json<DataResponse<Vec<SubjectComponent>>>> {
    let subject = find_subject(&state, id).await?;
    if !subject.is_composite {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{} is not a composite subject",
            subject.name
        ))));
    }
    validate_components(&input.components)?;

    let task_state = state.clone();
    let data = commit_detached(async move {
        let data =
            ComponentRepo::replace_for_subject(&task_state.pool, id, &input.components).await?;
        task_state.report_cache.invalidate_all().await;
        Ok(data)
    })
    .await?;

    tracing::info!(
        user_id = admin.user_id,
        subject_id = id,
        components = data.len(),
        "Subject components replaced"
    );
    Ok(Json(DataResponse { data }))
}

async fn find_subject(state: &AppState, id: DbId) -> AppResult<Subject> {
    SubjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Subject", id }))
}
