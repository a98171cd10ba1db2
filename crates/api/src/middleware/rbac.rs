//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects with 403 when the role does
//! not qualify. Finer checks (which class or subject a teacher may touch)
//! live in [`crate::access`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use shule_core::error::CoreError;
use shule_core::roles::{is_staff, ROLE_HEADTEACHER, ROLE_PARENT};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `headteacher` role.
///
/// ```ignore
/// async fn create_grade(RequireHeadteacher(_head): RequireHeadteacher) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireHeadteacher(pub AuthUser);

impl FromRequestParts<AppState> for RequireHeadteacher {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_HEADTEACHER {
            return Err(AppError::Core(CoreError::Forbidden(
                "Headteacher role required".into(),
            )));
        }
        Ok(RequireHeadteacher(user))
    }
}

/// Requires a staff role (headteacher, classteacher or teacher).
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !is_staff(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Staff role required".into(),
            )));
        }
        Ok(RequireStaff(user))
    }
}

/// Requires the `parent` role.
pub struct RequireParent(pub AuthUser);

impl FromRequestParts<AppState> for RequireParent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_PARENT {
            return Err(AppError::Core(CoreError::Forbidden(
                "Parent role required".into(),
            )));
        }
        Ok(RequireParent(user))
    }
}
