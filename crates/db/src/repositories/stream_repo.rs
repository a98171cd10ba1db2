//! Repository for the `streams` table.

use shule_core::types::DbId;
use sqlx::PgPool;

use crate::models::grade::{CreateStream, Stream};

const COLUMNS: &str = "id, grade_id, name, created_at, updated_at";

pub struct StreamRepo;

impl StreamRepo {
    pub async fn create(pool: &PgPool, input: &CreateStream) -> Result<Stream, sqlx::Error> {
        let query = format!(
            "INSERT INTO streams (grade_id, name)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Stream>(&query)
            .bind(input.grade_id)
            .bind(input.name.trim())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Stream>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM streams WHERE id = $1");
        sqlx::query_as::<_, Stream>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Streams of one grade, by name.
    pub async fn list_by_grade(pool: &PgPool, grade_id: DbId) -> Result<Vec<Stream>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM streams
             WHERE grade_id = $1
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Stream>(&query)
            .bind(grade_id)
            .fetch_all(pool)
            .await
    }
}
