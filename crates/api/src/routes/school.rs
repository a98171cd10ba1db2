//! Route definitions for grades, streams, terms and assessment types.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::school;
use crate::state::AppState;

/// Routes mounted at `/grades`.
///
/// ```text
/// GET  /                    -> list_grades
/// POST /                    -> create_grade
/// GET  /{id}                -> get_grade
/// GET  /{id}/streams        -> list_streams
/// POST /{id}/streams        -> create_stream
/// ```
pub fn grades_router() -> Router<AppState> {
    Router::new()
        .route("/", get(school::list_grades).post(school::create_grade))
        .route("/{id}", get(school::get_grade))
        .route(
            "/{id}/streams",
            get(school::list_streams).post(school::create_stream),
        )
}

/// Routes mounted at `/terms`.
///
/// ```text
/// GET  /                -> list_terms
/// POST /                -> create_term
/// GET  /current         -> get_current_term
/// POST /{id}/current    -> set_current_term
/// ```
pub fn terms_router() -> Router<AppState> {
    Router::new()
        .route("/", get(school::list_terms).post(school::create_term))
        .route("/current", get(school::get_current_term))
        .route("/{id}/current", post(school::set_current_term))
}

/// Routes mounted at `/assessment-types`.
///
/// ```text
/// GET  /   -> list_assessment_types
/// POST /   -> create_assessment_type
/// ```
pub fn assessment_types_router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(school::list_assessment_types).post(school::create_assessment_type),
    )
}
