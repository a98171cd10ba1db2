//! Student entity model and DTOs.

use serde::{Deserialize, Serialize};
use shule_core::report::ReportStudent;
use shule_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `students` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: DbId,
    pub admission_number: String,
    pub full_name: String,
    pub grade_id: DbId,
    pub stream_id: DbId,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Student {
    pub fn to_report_student(&self) -> ReportStudent {
        ReportStudent {
            id: self.id,
            admission_number: self.admission_number.clone(),
            full_name: self.full_name.clone(),
        }
    }
}

/// DTO for enrolling a student.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudent {
    pub admission_number: String,
    pub full_name: String,
    pub grade_id: DbId,
    pub stream_id: DbId,
}

/// DTO for updating a student. All fields are optional.
///
/// `grade_id` and `stream_id` must be given together when moving a student.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStudent {
    pub full_name: Option<String>,
    pub grade_id: Option<DbId>,
    pub stream_id: Option<DbId>,
    pub is_active: Option<bool>,
}
