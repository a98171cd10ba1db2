//! Teacher assignment model.
//!
//! An assignment with a `subject_id` lets a teacher enter marks for that
//! subject in one stream. An assignment without one makes the teacher the
//! class teacher of the stream (all subjects).

use serde::{Deserialize, Serialize};
use shule_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `teacher_assignments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeacherAssignment {
    pub id: DbId,
    pub user_id: DbId,
    pub grade_id: DbId,
    pub stream_id: DbId,
    pub subject_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TeacherAssignment {
    /// Whether this is a class-teacher assignment (all subjects).
    pub fn is_class_teacher(&self) -> bool {
        self.subject_id.is_none()
    }

    /// Whether this assignment covers `subject_id` in `stream_id`.
    pub fn covers(&self, stream_id: DbId, subject_id: DbId) -> bool {
        self.stream_id == stream_id
            && self.subject_id.map_or(true, |assigned| assigned == subject_id)
    }
}

/// DTO for creating an assignment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeacherAssignment {
    pub user_id: DbId,
    pub grade_id: DbId,
    pub stream_id: DbId,
    pub subject_id: Option<DbId>,
}
