//! Repository for the `assessment_types` table.

use shule_core::types::DbId;
use sqlx::PgPool;

use crate::models::term::{AssessmentType, CreateAssessmentType};

const COLUMNS: &str = "id, name, sort_order, created_at, updated_at";

pub struct AssessmentTypeRepo;

impl AssessmentTypeRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateAssessmentType,
    ) -> Result<AssessmentType, sqlx::Error> {
        let query = format!(
            "INSERT INTO assessment_types (name, sort_order)
             VALUES ($1, COALESCE($2, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssessmentType>(&query)
            .bind(input.name.trim())
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AssessmentType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assessment_types WHERE id = $1");
        sqlx::query_as::<_, AssessmentType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<AssessmentType>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM assessment_types ORDER BY sort_order ASC, name ASC");
        sqlx::query_as::<_, AssessmentType>(&query)
            .fetch_all(pool)
            .await
    }
}
