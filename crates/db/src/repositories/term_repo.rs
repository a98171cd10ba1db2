//! Repository for the `terms` table.

use shule_core::types::DbId;
use sqlx::PgPool;

use crate::models::term::{CreateTerm, Term};

const COLUMNS: &str = "id, name, academic_year, is_current, created_at, updated_at";

pub struct TermRepo;

impl TermRepo {
    /// Insert a term. When `is_current` is set, any other current term is
    /// cleared in the same transaction.
    pub async fn create(pool: &PgPool, input: &CreateTerm) -> Result<Term, sqlx::Error> {
        let mut tx = pool.begin().await?;
        if input.is_current {
            sqlx::query("UPDATE terms SET is_current = false WHERE is_current")
                .execute(&mut *tx)
                .await?;
        }
        let query = format!(
            "INSERT INTO terms (name, academic_year, is_current)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let term = sqlx::query_as::<_, Term>(&query)
            .bind(input.name.trim())
            .bind(input.academic_year)
            .bind(input.is_current)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(term)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Term>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM terms WHERE id = $1");
        sqlx::query_as::<_, Term>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_current(pool: &PgPool) -> Result<Option<Term>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM terms WHERE is_current");
        sqlx::query_as::<_, Term>(&query).fetch_optional(pool).await
    }

    /// Most recent academic year first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Term>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM terms ORDER BY academic_year DESC, name ASC");
        sqlx::query_as::<_, Term>(&query).fetch_all(pool).await
    }

    /// Make `id` the only current term. Returns `None` if it does not exist.
    pub async fn set_current(pool: &PgPool, id: DbId) -> Result<Option<Term>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("UPDATE terms SET is_current = false WHERE is_current AND id <> $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let query = format!("UPDATE terms SET is_current = true WHERE id = $1 RETURNING {COLUMNS}");
        let term = sqlx::query_as::<_, Term>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        // Dropping the transaction without commit keeps the old current term.
        if term.is_some() {
            tx.commit().await?;
        }
        Ok(term)
    }
}
