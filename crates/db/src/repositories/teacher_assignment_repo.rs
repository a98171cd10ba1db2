//! Repository for the `teacher_assignments` table.

use shule_core::types::DbId;
use sqlx::PgPool;

use crate::models::teacher_assignment::{CreateTeacherAssignment, TeacherAssignment};

const COLUMNS: &str = "id, user_id, grade_id, stream_id, subject_id, created_at, updated_at";

pub struct TeacherAssignmentRepo;

impl TeacherAssignmentRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateTeacherAssignment,
    ) -> Result<TeacherAssignment, sqlx::Error> {
        let query = format!(
            "INSERT INTO teacher_assignments (user_id, grade_id, stream_id, subject_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeacherAssignment>(&query)
            .bind(input.user_id)
            .bind(input.grade_id)
            .bind(input.stream_id)
            .bind(input.subject_id)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teacher_assignments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<TeacherAssignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM teacher_assignments
             WHERE user_id = $1
             ORDER BY grade_id ASC, stream_id ASC, subject_id ASC NULLS FIRST"
        );
        sqlx::query_as::<_, TeacherAssignment>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// All assignments, optionally for one user.
    pub async fn list(
        pool: &PgPool,
        user_id: Option<DbId>,
    ) -> Result<Vec<TeacherAssignment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM teacher_assignments
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
             ORDER BY user_id ASC, id ASC"
        );
        sqlx::query_as::<_, TeacherAssignment>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
