//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller, from a JWT Bearer token.
//! - [`rbac::RequireHeadteacher`] -- headteacher only.
//! - [`rbac::RequireStaff`] -- any staff role.
//! - [`rbac::RequireParent`] -- parent accounts.

pub mod auth;
pub mod rbac;
