//! Route definitions for the `/students` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::students;
use crate::state::AppState;

/// Routes mounted at `/students`.
///
/// ```text
/// GET  /?grade_id=&stream_id=   -> list_students
/// POST /                        -> create_student
/// GET  /{id}                    -> get_student
/// PUT  /{id}                    -> update_student
/// GET  /{id}/guardians          -> list_guardians
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(students::list_students).post(students::create_student),
        )
        .route(
            "/{id}",
            get(students::get_student).put(students::update_student),
        )
        .route("/{id}/guardians", get(students::list_guardians))
}
