//! Repository for the `guardian_links` table.

use shule_core::types::DbId;
use sqlx::PgPool;

use crate::models::guardian::{CreateGuardianLink, GuardianLink};
use crate::models::student::Student;

const COLUMNS: &str = "id, parent_user_id, student_id, relationship, created_at, updated_at";

/// Parent-to-student links used by the parent portal.
pub struct GuardianRepo;

impl GuardianRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateGuardianLink,
    ) -> Result<GuardianLink, sqlx::Error> {
        let query = format!(
            "INSERT INTO guardian_links (parent_user_id, student_id, relationship)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GuardianLink>(&query)
            .bind(input.parent_user_id)
            .bind(input.student_id)
            .bind(&input.relationship)
            .fetch_one(pool)
            .await
    }

    /// Remove a link. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM guardian_links WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<GuardianLink>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM guardian_links
             WHERE student_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, GuardianLink>(&query)
            .bind(student_id)
            .fetch_all(pool)
            .await
    }

    /// Students linked to a parent account, by admission number.
    pub async fn list_students_for_parent(
        pool: &PgPool,
        parent_user_id: DbId,
    ) -> Result<Vec<Student>, sqlx::Error> {
        sqlx::query_as::<_, Student>(
            "SELECT s.id, s.admission_number, s.full_name, s.grade_id, s.stream_id,
                    s.is_active, s.created_at, s.updated_at
             FROM students s
             JOIN guardian_links g ON g.student_id = s.id
             WHERE g.parent_user_id = $1
             ORDER BY s.admission_number ASC",
        )
        .bind(parent_user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn is_linked(
        pool: &PgPool,
        parent_user_id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM guardian_links WHERE parent_user_id = $1 AND student_id = $2
             )",
        )
        .bind(parent_user_id)
        .bind(student_id)
        .fetch_one(pool)
        .await
    }
}
