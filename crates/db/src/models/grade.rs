//! Grade and stream models.
//!
//! A grade (e.g. "Grade 8") is split into one or more streams
//! (e.g. "East", "West"). A class is a (grade, stream) pair.

use serde::{Deserialize, Serialize};
use shule_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `grades` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Grade {
    pub id: DbId,
    pub name: String,
    pub grade_number: i32,
    pub education_level: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a grade.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGrade {
    pub name: String,
    pub grade_number: i32,
    /// Inferred from `grade_number` when omitted.
    pub education_level: Option<String>,
}

/// A row from the `streams` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Stream {
    pub id: DbId,
    pub grade_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a stream. `grade_id` is taken from the URL path.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStream {
    #[serde(default)]
    pub grade_id: DbId,
    pub name: String,
}
