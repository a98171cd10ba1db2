//! Route definitions for the parent portal.

use axum::routing::get;
use axum::Router;

use crate::handlers::portal;
use crate::state::AppState;

/// Routes mounted at `/portal`. Parent role only.
///
/// ```text
/// GET /children                 -> list_children
/// GET /children/{id}/report     -> child_report
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/children", get(portal::list_children))
        .route("/children/{id}/report", get(portal::child_report))
}
