//! Repository for the `subject_components` table.

use shule_core::composite::ComponentDef;
use shule_core::types::DbId;
use sqlx::PgPool;

use crate::models::subject::SubjectComponent;

const COLUMNS: &str =
    "id, subject_id, name, weight, max_raw_mark, sort_order, created_at, updated_at";

pub struct ComponentRepo;

impl ComponentRepo {
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SubjectComponent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subject_components WHERE id = $1");
        sqlx::query_as::<_, SubjectComponent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_subject(
        pool: &PgPool,
        subject_id: DbId,
    ) -> Result<Vec<SubjectComponent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subject_components
             WHERE subject_id = $1
             ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, SubjectComponent>(&query)
            .bind(subject_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_for_subjects(
        pool: &PgPool,
        subject_ids: &[DbId],
    ) -> Result<Vec<SubjectComponent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subject_components
             WHERE subject_id = ANY($1)
             ORDER BY subject_id ASC, sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, SubjectComponent>(&query)
            .bind(subject_ids)
            .fetch_all(pool)
            .await
    }

    /// Replace a subject's component set in one transaction.
    ///
    /// Components are matched by name: existing rows are updated in place
    /// (keeping their ids and therefore their marks), new names are
    /// inserted, and rows whose name is no longer present are deleted
    /// together with their marks. When a kept component's `max_raw_mark`
    /// changes, its stored marks are rescaled to the new maximum so their
    /// percentages are unchanged and no raw mark exceeds the new maximum.
    /// The caller validates `defs` first.
    pub async fn replace_for_subject(
        pool: &PgPool,
        subject_id: DbId,
        defs: &[ComponentDef],
    ) -> Result<Vec<SubjectComponent>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let names: Vec<String> = defs.iter().map(|d| d.name.trim().to_string()).collect();
        sqlx::query("DELETE FROM subject_components WHERE subject_id = $1 AND NOT (name = ANY($2))")
            .bind(subject_id)
            .bind(&names)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO subject_components (subject_id, name, weight, max_raw_mark, sort_order)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (subject_id, name) DO UPDATE SET
                weight = EXCLUDED.weight,
                max_raw_mark = EXCLUDED.max_raw_mark,
                sort_order = EXCLUDED.sort_order
             RETURNING {COLUMNS}"
        );
        let mut rows = Vec::with_capacity(defs.len());
        for (position, (def, name)) in defs.iter().zip(&names).enumerate() {
            sqlx::query(
                "UPDATE marks m SET
                    raw_mark = LEAST(m.raw_mark * $3 / c.max_raw_mark, $3),
                    total_possible = $3
                 FROM subject_components c
                 WHERE c.subject_id = $1
                   AND c.name = $2
                   AND m.component_id = c.id
                   AND c.max_raw_mark <> $3",
            )
            .bind(subject_id)
            .bind(name)
            .bind(def.max_raw_mark)
            .execute(&mut *tx)
            .await?;

            let row = sqlx::query_as::<_, SubjectComponent>(&query)
                .bind(subject_id)
                .bind(name)
                .bind(def.weight)
                .bind(def.max_raw_mark)
                .bind(position as i32)
                .fetch_one(&mut *tx)
                .await?;
            rows.push(row);
        }

        sqlx::query("UPDATE subjects SET is_composite = $2 WHERE id = $1")
            .bind(subject_id)
            .bind(!defs.is_empty())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(rows)
    }
}
