//! Repository for the `marks` table.
//!
//! A mark is keyed by `(student, subject, term, assessment type)` for a
//! plain subject, or `(student, component, term, assessment type)` for a
//! composite component. Each key is enforced by a partial unique index, so
//! upserts name the index predicate in their `ON CONFLICT` target.

use shule_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::mark::{Mark, UpsertMark};

const COLUMNS: &str = "id, student_id, subject_id, component_id, term_id, assessment_type_id, \
                        raw_mark, total_possible, percentage, entered_by, created_at, updated_at";

const SUBJECT_CONFLICT: &str = "ON CONFLICT (student_id, subject_id, term_id, assessment_type_id) \
                                WHERE component_id IS NULL";

const COMPONENT_CONFLICT: &str =
    "ON CONFLICT (student_id, component_id, term_id, assessment_type_id) \
     WHERE component_id IS NOT NULL";

pub struct MarkRepo;

impl MarkRepo {
    /// Insert or overwrite a single mark. The conflict target is chosen by
    /// whether `component_id` is set.
    pub async fn upsert(pool: &PgPool, input: &UpsertMark) -> Result<Mark, sqlx::Error> {
        upsert_with(pool, input).await
    }

    /// Upsert a batch of marks atomically. Either every row is written or
    /// none are.
    pub async fn upsert_many(
        pool: &PgPool,
        inputs: &[UpsertMark],
    ) -> Result<Vec<Mark>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut rows = Vec::with_capacity(inputs.len());
        for input in inputs {
            rows.push(upsert_with(&mut *tx, input).await?);
        }
        tx.commit().await?;
        Ok(rows)
    }

    /// Every mark of one student for a term and assessment type.
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
        term_id: DbId,
        assessment_type_id: DbId,
    ) -> Result<Vec<Mark>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM marks
             WHERE student_id = $1 AND term_id = $2 AND assessment_type_id = $3
             ORDER BY subject_id ASC, component_id ASC NULLS FIRST"
        );
        sqlx::query_as::<_, Mark>(&query)
            .bind(student_id)
            .bind(term_id)
            .bind(assessment_type_id)
            .fetch_all(pool)
            .await
    }

    /// Marks for a set of students and subjects in one term and
    /// assessment type. Plain and component rows are both returned.
    pub async fn list_for_class(
        pool: &PgPool,
        student_ids: &[DbId],
        subject_ids: &[DbId],
        term_id: DbId,
        assessment_type_id: DbId,
    ) -> Result<Vec<Mark>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM marks
             WHERE student_id = ANY($1)
               AND subject_id = ANY($2)
               AND term_id = $3
               AND assessment_type_id = $4
             ORDER BY student_id ASC, subject_id ASC, component_id ASC NULLS FIRST"
        );
        sqlx::query_as::<_, Mark>(&query)
            .bind(student_ids)
            .bind(subject_ids)
            .bind(term_id)
            .bind(assessment_type_id)
            .fetch_all(pool)
            .await
    }

    /// Component marks of one student for one composite subject.
    pub async fn list_component_marks(
        pool: &PgPool,
        student_id: DbId,
        subject_id: DbId,
        term_id: DbId,
        assessment_type_id: DbId,
    ) -> Result<Vec<Mark>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM marks
             WHERE student_id = $1
               AND subject_id = $2
               AND term_id = $3
               AND assessment_type_id = $4
               AND component_id IS NOT NULL
             ORDER BY component_id ASC"
        );
        sqlx::query_as::<_, Mark>(&query)
            .bind(student_id)
            .bind(subject_id)
            .bind(term_id)
            .bind(assessment_type_id)
            .fetch_all(pool)
            .await
    }
}

async fn upsert_with<'e>(
    executor: impl PgExecutor<'e>,
    input: &UpsertMark,
) -> Result<Mark, sqlx::Error> {
    sqlx::query_as::<_, Mark>(&upsert_query(input))
        .bind(input.student_id)
        .bind(input.subject_id)
        .bind(input.component_id)
        .bind(input.term_id)
        .bind(input.assessment_type_id)
        .bind(input.raw_mark)
        .bind(input.total_possible)
        .bind(input.percentage)
        .bind(input.entered_by)
        .fetch_one(executor)
        .await
}

fn upsert_query(input: &UpsertMark) -> String {
    let conflict = if input.component_id.is_some() {
        COMPONENT_CONFLICT
    } else {
        SUBJECT_CONFLICT
    };
    format!(
        "INSERT INTO marks
            (student_id, subject_id, component_id, term_id, assessment_type_id,
             raw_mark, total_possible, percentage, entered_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         {conflict}
         DO UPDATE SET
            raw_mark = EXCLUDED.raw_mark,
            total_possible = EXCLUDED.total_possible,
            percentage = EXCLUDED.percentage,
            entered_by = EXCLUDED.entered_by
         RETURNING {COLUMNS}"
    )
}
