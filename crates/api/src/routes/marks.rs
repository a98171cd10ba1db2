//! Route definitions for the `/marks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::marks;
use crate::state::AppState;

/// Routes mounted at `/marks`.
///
/// ```text
/// GET  /?student_id=&term_id=&assessment_type_id=   -> list_student_marks
/// POST /component                                   -> upload_component_mark
/// POST /subject                                     -> upload_subject_mark
/// POST /bulk                                        -> upload_bulk
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(marks::list_student_marks))
        .route("/component", post(marks::upload_component_mark))
        .route("/subject", post(marks::upload_subject_mark))
        .route("/bulk", post(marks::upload_bulk))
}
