//! Repository for the `students` table.

use shule_core::types::DbId;
use sqlx::PgPool;

use crate::models::student::{CreateStudent, Student, UpdateStudent};

const COLUMNS: &str =
    "id, admission_number, full_name, grade_id, stream_id, is_active, created_at, updated_at";

pub struct StudentRepo;

impl StudentRepo {
    /// Enrol a student. The `(stream_id, grade_id)` foreign key rejects a
    /// stream that belongs to another grade.
    pub async fn create(pool: &PgPool, input: &CreateStudent) -> Result<Student, sqlx::Error> {
        let query = format!(
            "INSERT INTO students (admission_number, full_name, grade_id, stream_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(input.admission_number.trim())
            .bind(input.full_name.trim())
            .bind(input.grade_id)
            .bind(input.stream_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM students WHERE id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Active students of a grade, optionally narrowed to one stream,
    /// ordered by admission number.
    pub async fn list_by_class(
        pool: &PgPool,
        grade_id: DbId,
        stream_id: Option<DbId>,
    ) -> Result<Vec<Student>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM students
             WHERE grade_id = $1
               AND ($2::BIGINT IS NULL OR stream_id = $2)
               AND is_active
             ORDER BY admission_number ASC"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(grade_id)
            .bind(stream_id)
            .fetch_all(pool)
            .await
    }

    /// Partial update. Returns `None` if the student does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateStudent,
    ) -> Result<Option<Student>, sqlx::Error> {
        let query = format!(
            "UPDATE students SET
                full_name = COALESCE($2, full_name),
                grade_id = COALESCE($3, grade_id),
                stream_id = COALESCE($4, stream_id),
                is_active = COALESCE($5, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .bind(input.full_name.as_deref().map(str::trim))
            .bind(input.grade_id)
            .bind(input.stream_id)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }
}
