//! Handlers for the `/admin` resource: user accounts, teacher assignments
//! and guardian links.
//!
//! All handlers require the `headteacher` role via [`RequireHeadteacher`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use shule_core::error::CoreError;
use shule_core::roles::{is_staff, ROLE_PARENT};
use shule_core::types::DbId;
use shule_db::models::guardian::{CreateGuardianLink, GuardianLink};
use shule_db::models::teacher_assignment::{CreateTeacherAssignment, TeacherAssignment};
use shule_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use shule_db::repositories::{
    GuardianRepo, RoleRepo, SessionRepo, StreamRepo, SubjectRepo, TeacherAssignmentRepo,
    UserRepo,
};
use validator::Validate;

use crate::auth::password::{hash_password, validate_password};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireHeadteacher;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    pub password: String,
    pub role_id: DbId,
}

/// Request body for `PUT /admin/users/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub full_name: Option<String>,
    pub role_id: Option<DbId>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /admin/users/{id}/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

/// Query for `GET /admin/users`.
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    /// Role name filter, e.g. `teacher`.
    pub role: Option<String>,
}

/// Query for `GET /admin/assignments`.
#[derive(Debug, Deserialize)]
pub struct AssignmentListParams {
    pub user_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    RequireHeadteacher(admin): RequireHeadteacher,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    input.validate()?;
    validate_password(&input.password)?;

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create_dto = CreateUser {
        username: input.username.trim().to_string(),
        email: input.email.trim().to_lowercase(),
        full_name: input.full_name.trim().to_string(),
        password_hash: hashed,
        role_id: input.role_id,
    };
    let user = UserRepo::create(&state.pool, &create_dto).await?;

    tracing::info!(admin_id = admin.user_id, user_id = user.id, "User created");
    let response = user_to_response(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let role_filter = match params.role.as_deref() {
        Some(name) => Some(
            RoleRepo::find_by_name(&state.pool, name)
                .await?
                .ok_or_else(|| AppError::BadRequest(format!("Unknown role '{name}'")))?
                .id,
        ),
        None => None,
    };
    let users = UserRepo::list(&state.pool, role_filter).await?;

    // One role lookup for the whole page.
    let roles = RoleRepo::list(&state.pool).await?;
    let data = users
        .iter()
        .map(|u| {
            let role_name = roles
                .iter()
                .find(|r| r.id == u.role_id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| "unknown".to_string());
            UserResponse::from_user(u, role_name)
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(user_to_response(&state, &user).await?))
}

/// PUT /api/v1/admin/users/{id}
///
/// Profile fields only; passwords go through `reset-password`.
pub async fn update_user(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    input.validate()?;
    let update_dto = UpdateUser {
        username: input.username.map(|s| s.trim().to_string()),
        email: input.email.map(|s| s.trim().to_lowercase()),
        full_name: input.full_name.map(|s| s.trim().to_string()),
        role_id: input.role_id,
        is_active: input.is_active,
    };

    let user = UserRepo::update(&state.pool, id, &update_dto)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(user_to_response(&state, &user).await?))
}

/// POST /api/v1/admin/users/{id}/deactivate
///
/// Soft-deactivates the account and revokes its sessions.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireHeadteacher(admin): RequireHeadteacher,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot deactivate your own account".into(),
        )));
    }
    if !UserRepo::deactivate(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    tracing::info!(admin_id = admin.user_id, user_id = id, "User deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Path(id): Path<DbId>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password(&input.new_password)?;
    let hashed = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if UserRepo::update_password(&state.pool, id, &hashed).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}

// ---------------------------------------------------------------------------
// Teacher assignments
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/assignments
pub async fn list_assignments(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Query(params): Query<AssignmentListParams>,
) -> AppResult<Json<DataResponse<Vec<TeacherAssignment>>>> {
    let data = TeacherAssignmentRepo::list(&state.pool, params.user_id).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/admin/assignments
///
/// Omit `subject_id` to make the user class teacher of the stream.
pub async fn create_assignment(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Json(input): Json<CreateTeacherAssignment>,
) -> AppResult<(StatusCode, Json<TeacherAssignment>)> {
    let user = find_user(&state, input.user_id).await?;
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    if !is_staff(&role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{} is not a staff account",
            user.username
        ))));
    }

    let stream = StreamRepo::find_by_id(&state.pool, input.stream_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Stream",
            id: input.stream_id,
        }))?;
    if stream.grade_id != input.grade_id {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Stream {} does not belong to grade {}",
            stream.id, input.grade_id
        ))));
    }
    if let Some(subject_id) = input.subject_id {
        SubjectRepo::find_by_id(&state.pool, subject_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Subject",
                id: subject_id,
            }))?;
    }

    let assignment = TeacherAssignmentRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// DELETE /api/v1/admin/assignments/{id}
pub async fn delete_assignment(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if TeacherAssignmentRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "TeacherAssignment",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Guardian links
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/guardians
pub async fn create_guardian(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Json(input): Json<CreateGuardianLink>,
) -> AppResult<(StatusCode, Json<GuardianLink>)> {
    let user = find_user(&state, input.parent_user_id).await?;
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    if role != ROLE_PARENT {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{} is not a parent account",
            user.username
        ))));
    }

    let link = GuardianRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// DELETE /api/v1/admin/guardians/{id}
pub async fn delete_guardian(
    State(state): State<AppState>,
    RequireHeadteacher(_admin): RequireHeadteacher,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if GuardianRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "GuardianLink",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

/// Convert a [`User`] row into a [`UserResponse`] by resolving the role name.
async fn user_to_response(state: &AppState, user: &User) -> AppResult<UserResponse> {
    let role_name = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(UserResponse::from_user(user, role_name))
}
