//! Route definitions for the `/subjects` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::subjects;
use crate::state::AppState;

/// Routes mounted at `/subjects`.
///
/// ```text
/// GET /?education_level=     -> list_subjects
/// POST /                     -> create_subject
/// GET /{id}                  -> get_subject
/// PUT /{id}                  -> update_subject
/// GET /{id}/components       -> list_components
/// PUT /{id}/components       -> replace_components
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(subjects::list_subjects).post(subjects::create_subject),
        )
        .route(
            "/{id}",
            get(subjects::get_subject).put(subjects::update_subject),
        )
        .route(
            "/{id}/components",
            get(subjects::list_components).put(subjects::replace_components),
        )
}
