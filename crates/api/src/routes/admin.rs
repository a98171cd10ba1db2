//! Route definitions for the `/admin` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `headteacher` role (enforced by handler extractors).
///
/// ```text
/// GET    /users                       -> list_users
/// POST   /users                       -> create_user
/// GET    /users/{id}                  -> get_user
/// PUT    /users/{id}                  -> update_user
/// POST   /users/{id}/deactivate       -> deactivate_user
/// POST   /users/{id}/reset-password   -> reset_password
/// GET    /assignments                 -> list_assignments
/// POST   /assignments                 -> create_assignment
/// DELETE /assignments/{id}            -> delete_assignment
/// POST   /guardians                   -> create_guardian
/// DELETE /guardians/{id}              -> delete_guardian
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/{id}", get(admin::get_user).put(admin::update_user))
        .route("/users/{id}/deactivate", post(admin::deactivate_user))
        .route("/users/{id}/reset-password", post(admin::reset_password))
        .route(
            "/assignments",
            get(admin::list_assignments).post(admin::create_assignment),
        )
        .route("/assignments/{id}", delete(admin::delete_assignment))
        .route("/guardians", post(admin::create_guardian))
        .route("/guardians/{id}", delete(admin::delete_guardian))
}
