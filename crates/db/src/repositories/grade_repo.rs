//! Repository for the `grades` table.

use shule_core::types::DbId;
use sqlx::PgPool;

use crate::models::grade::{CreateGrade, Grade};

const COLUMNS: &str = "id, name, grade_number, education_level, created_at, updated_at";

pub struct GradeRepo;

impl GradeRepo {
    /// Insert a grade. `education_level` must already be resolved.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGrade,
        education_level: &str,
    ) -> Result<Grade, sqlx::Error> {
        let query = format!(
            "INSERT INTO grades (name, grade_number, education_level)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Grade>(&query)
            .bind(input.name.trim())
            .bind(input.grade_number)
            .bind(education_level)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Grade>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM grades WHERE id = $1");
        sqlx::query_as::<_, Grade>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All grades in ascending grade number.
    pub async fn list(pool: &PgPool) -> Result<Vec<Grade>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM grades ORDER BY grade_number ASC");
        sqlx::query_as::<_, Grade>(&query).fetch_all(pool).await
    }
}
