//! Mark model and DTOs.
//!
//! A mark is keyed by (student, subject, component, term, assessment type).
//! `component_id` is `None` for atomic subjects. `percentage` is derived from
//! `raw_mark / total_possible` when the mark is written.

use serde::Serialize;
use shule_core::report::ReportMark;
use shule_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `marks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Mark {
    pub id: DbId,
    pub student_id: DbId,
    pub subject_id: DbId,
    pub component_id: Option<DbId>,
    pub term_id: DbId,
    pub assessment_type_id: DbId,
    pub raw_mark: f64,
    pub total_possible: f64,
    pub percentage: f64,
    pub entered_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Mark {
    pub fn to_report_mark(&self) -> ReportMark {
        ReportMark {
            student_id: self.student_id,
            subject_id: self.subject_id,
            component_id: self.component_id,
            raw_mark: self.raw_mark,
            percentage: self.percentage,
        }
    }
}

/// DTO for inserting or superseding a mark. Built by the upload handlers
/// after validation; never deserialized from a request directly.
#[derive(Debug, Clone)]
pub struct UpsertMark {
    pub student_id: DbId,
    pub subject_id: DbId,
    pub component_id: Option<DbId>,
    pub term_id: DbId,
    pub assessment_type_id: DbId,
    pub raw_mark: f64,
    pub total_possible: f64,
    pub percentage: f64,
    pub entered_by: Option<DbId>,
}
