//! Well-known role name constants.
//!
//! These must match the seed data in `20261016000002_create_roles_table.sql`.

pub const ROLE_HEADTEACHER: &str = "headteacher";
pub const ROLE_CLASSTEACHER: &str = "classteacher";
pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_PARENT: &str = "parent";

/// Roles that belong to school staff (everyone except parents).
pub const STAFF_ROLES: &[&str] = &[ROLE_HEADTEACHER, ROLE_CLASSTEACHER, ROLE_TEACHER];

/// Returns `true` if the role is a staff role.
pub fn is_staff(role: &str) -> bool {
    STAFF_ROLES.contains(&role)
}
