//! Row-level access rules on top of the role extractors.
//!
//! - Headteachers may read and write everything.
//! - A class teacher assignment (`subject_id IS NULL`) covers every subject
//!   of that stream.
//! - A subject assignment covers one subject in one stream.
//! - Parents see only students linked to them.

use shule_core::error::CoreError;
use shule_core::roles::{is_staff, ROLE_PARENT};
use shule_core::types::DbId;
use shule_db::models::student::Student;
use shule_db::models::teacher_assignment::TeacherAssignment;
use shule_db::repositories::{GuardianRepo, TeacherAssignmentRepo};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

fn forbidden(msg: &str) -> AppError {
    AppError::Core(CoreError::Forbidden(msg.to_string()))
}

/// What a user may write marks for, loaded once per request.
#[derive(Debug)]
pub struct MarkEntryScope {
    unrestricted: bool,
    assignments: Vec<TeacherAssignment>,
}

impl MarkEntryScope {
    pub async fn load(pool: &PgPool, user: &AuthUser) -> AppResult<Self> {
        if user.is_headteacher() {
            return Ok(Self {
                unrestricted: true,
                assignments: Vec::new(),
            });
        }
        if !is_staff(&user.role) {
            return Err(forbidden("Only staff may enter marks"));
        }
        Ok(Self {
            unrestricted: false,
            assignments: TeacherAssignmentRepo::list_for_user(pool, user.user_id).await?,
        })
    }

    /// Reject unless marks for `subject_id` in `stream_id` are writable.
    pub fn ensure(&self, stream_id: DbId, subject_id: DbId) -> AppResult<()> {
        if self.unrestricted || self.assignments.iter().any(|a| a.covers(stream_id, subject_id)) {
            Ok(())
        } else {
            Err(forbidden("You are not assigned to this class and subject"))
        }
    }
}

/// Resolve which subjects `user` may see in a class report.
///
/// Returns the subject filter to apply: `requested` unchanged when the user
/// may see the whole class, otherwise the requested subjects narrowed to
/// the user's own (or all of them when nothing was requested). A request
/// naming a subject the user does not teach is rejected, and so is a
/// whole-grade request (no `stream_id`) from anyone but a headteacher.
pub async fn report_subject_scope(
    pool: &PgPool,
    user: &AuthUser,
    grade_id: DbId,
    stream_id: Option<DbId>,
    requested: Option<Vec<DbId>>,
) -> AppResult<Option<Vec<DbId>>> {
    if user.is_headteacher() {
        return Ok(requested);
    }
    if !is_staff(&user.role) {
        return Err(forbidden("Only staff may view class reports"));
    }

    // A whole-grade report spans every stream; only headteachers see that.
    let Some(stream_id) = stream_id else {
        return Err(forbidden("Select a stream: whole-grade reports are headteacher only"));
    };

    let assignments: Vec<TeacherAssignment> =
        TeacherAssignmentRepo::list_for_user(pool, user.user_id)
            .await?
            .into_iter()
            .filter(|a| a.grade_id == grade_id && a.stream_id == stream_id)
            .collect();

    if assignments.iter().any(|a| a.is_class_teacher()) {
        return Ok(requested);
    }

    let mut own: Vec<DbId> = assignments.iter().filter_map(|a| a.subject_id).collect();
    own.sort_unstable();
    own.dedup();
    if own.is_empty() {
        return Err(forbidden("You have no assignments in this class"));
    }

    match requested {
        None => Ok(Some(own)),
        Some(ids) => {
            if let Some(id) = ids.iter().find(|id| own.binary_search(*id).is_err()) {
                return Err(AppError::Core(CoreError::Forbidden(format!(
                    "You are not assigned to subject {id} in this class"
                ))));
            }
            Ok(Some(ids))
        }
    }
}

/// Reject unless `user` may see `student`'s report card.
pub async fn ensure_can_view_student(
    pool: &PgPool,
    user: &AuthUser,
    student: &Student,
) -> AppResult<()> {
    if user.is_headteacher() {
        return Ok(());
    }
    if user.role == ROLE_PARENT {
        return if GuardianRepo::is_linked(pool, user.user_id, student.id).await? {
            Ok(())
        } else {
            Err(forbidden("Student is not linked to your account"))
        };
    }
    if !is_staff(&user.role) {
        return Err(forbidden("Access denied"));
    }
    let assignments = TeacherAssignmentRepo::list_for_user(pool, user.user_id).await?;
    if assignments.iter().any(|a| a.stream_id == student.stream_id) {
        Ok(())
    } else {
        Err(forbidden("You are not assigned to this student's class"))
    }
}
