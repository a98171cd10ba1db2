//! Domain logic for the Shule school records backend.
//!
//! Everything in this crate is pure: no database access, no HTTP. The `db`
//! and `api` crates feed rows in and persist or serve what comes out.

pub mod composite;
pub mod error;
pub mod marks;
pub mod performance;
pub mod report;
pub mod roles;
pub mod school;
pub mod statistics;
pub mod types;
