//! Request handlers, one submodule per resource.
//!
//! Handlers extract and authorize, then delegate to a repository in
//! `shule_db` or to [`crate::reporting`] and map errors via
//! [`crate::error::AppError`].

pub mod admin;
pub mod auth;
pub mod marks;
pub mod portal;
pub mod reports;
pub mod school;
pub mod students;
pub mod subjects;
