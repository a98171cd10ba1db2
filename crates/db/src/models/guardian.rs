//! Parent/guardian to student links.

use serde::{Deserialize, Serialize};
use shule_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `guardian_links` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GuardianLink {
    pub id: DbId,
    pub parent_user_id: DbId,
    pub student_id: DbId,
    pub relationship: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for linking a parent account to a student.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGuardianLink {
    pub parent_user_id: DbId,
    pub student_id: DbId,
    pub relationship: Option<String>,
}
