pub mod admin;
pub mod auth;
pub mod health;
pub mod marks;
pub mod portal;
pub mod reports;
pub mod school;
pub mod students;
pub mod subjects;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login, /auth/refresh, /auth/logout          public (logout needs auth)
///
/// /admin/users[/{id}[/deactivate|/reset-password]]  headteacher
/// /admin/assignments[/{id}]                         headteacher
/// /admin/guardians[/{id}]                           headteacher
///
/// /grades[/{id}[/streams]]                          read: staff, write: headteacher
/// /terms[/current|/{id}/current]                    read: staff, write: headteacher
/// /assessment-types                                 read: staff, write: headteacher
///
/// /students[/{id}[/guardians]]                      staff / headteacher
/// /subjects[/{id}[/components]]                     read: staff, write: headteacher
///
/// /marks, /marks/component, /marks/subject, /marks/bulk
/// /reports/composite, /reports/class, /reports/student/{id}
///
/// /portal/children[/{id}/report]                    parent
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/grades", school::grades_router())
        .nest("/terms", school::terms_router())
        .nest("/assessment-types", school::assessment_types_router())
        .nest("/students", students::router())
        .nest("/subjects", subjects::router())
        .nest("/marks", marks::router())
        .nest("/reports", reports::router())
        .nest("/portal", portal::router())
}
