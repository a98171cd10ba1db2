//! Route definitions for the `/reports` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::reports;
use crate::state::AppState;

/// Routes mounted at `/reports`.
///
/// ```text
/// GET /composite?student_id=&subject_id=&term_id=&assessment_type_id=
/// GET /class?grade_id=&stream_id=&term_id=&assessment_type_id=&subject_ids=
/// GET /student/{id}?term_id=&assessment_type_id=
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/composite", get(reports::composite))
        .route("/class", get(reports::class_report))
        .route("/student/{id}", get(reports::student_report))
}
