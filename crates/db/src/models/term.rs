//! Term and assessment type models.

use serde::{Deserialize, Serialize};
use shule_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `terms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Term {
    pub id: DbId,
    pub name: String,
    pub academic_year: i32,
    pub is_current: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a term.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTerm {
    pub name: String,
    pub academic_year: i32,
    #[serde(default)]
    pub is_current: bool,
}

/// A row from the `assessment_types` table (e.g. "Midterm", "End Term").
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssessmentType {
    pub id: DbId,
    pub name: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an assessment type.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssessmentType {
    pub name: String,
    pub sort_order: Option<i32>,
}
