//! Repository for the `subjects` table.
//!
//! Component rows live in [`ComponentRepo`](super::ComponentRepo); the
//! `*_with_components` helpers here stitch the two together.

use std::collections::HashMap;

use shule_core::types::DbId;
use sqlx::PgPool;

use crate::models::subject::{CreateSubject, Subject, SubjectWithComponents, UpdateSubject};
use crate::repositories::ComponentRepo;

const COLUMNS: &str =
    "id, name, education_level, is_composite, sort_order, is_active, created_at, updated_at";

pub struct SubjectRepo;

impl SubjectRepo {
    pub async fn create(pool: &PgPool, input: &CreateSubject) -> Result<Subject, sqlx::Error> {
        let query = format!(
            "INSERT INTO subjects (name, education_level, is_composite, sort_order)
             VALUES ($1, $2, $3, COALESCE($4, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subject>(&query)
            .bind(input.name.trim())
            .bind(&input.education_level)
            .bind(input.is_composite)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Subject>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subjects WHERE id = $1");
        sqlx::query_as::<_, Subject>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Subjects for an education level (all levels when `None`), in
    /// display order.
    pub async fn list(
        pool: &PgPool,
        education_level: Option<&str>,
        include_inactive: bool,
    ) -> Result<Vec<Subject>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subjects
             WHERE ($1::TEXT IS NULL OR education_level = $1)
               AND ($2 OR is_active)
             ORDER BY sort_order ASC, name ASC"
        );
        sqlx::query_as::<_, Subject>(&query)
            .bind(education_level)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSubject,
    ) -> Result<Option<Subject>, sqlx::Error> {
        let query = format!(
            "UPDATE subjects SET
                name = COALESCE($2, name),
                sort_order = COALESCE($3, sort_order),
                is_active = COALESCE($4, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subject>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// A subject together with its components in display order.
    pub async fn find_with_components(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SubjectWithComponents>, sqlx::Error> {
        let Some(subject) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let components = ComponentRepo::list_for_subject(pool, id).await?;
        Ok(Some(SubjectWithComponents {
            subject,
            components,
        }))
    }

    /// Active subjects of a level with their components. When `ids` is
    /// given only those subjects are returned.
    pub async fn list_with_components(
        pool: &PgPool,
        education_level: &str,
        ids: Option<&[DbId]>,
    ) -> Result<Vec<SubjectWithComponents>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subjects
             WHERE education_level = $1
               AND is_active
               AND ($2::BIGINT[] IS NULL OR id = ANY($2))
             ORDER BY sort_order ASC, name ASC"
        );
        let subjects = sqlx::query_as::<_, Subject>(&query)
            .bind(education_level)
            .bind(ids)
            .fetch_all(pool)
            .await?;

        let subject_ids: Vec<DbId> = subjects.iter().map(|s| s.id).collect();
        let mut by_subject: HashMap<DbId, Vec<_>> = HashMap::new();
        for component in ComponentRepo::list_for_subjects(pool, &subject_ids).await? {
            by_subject
                .entry(component.subject_id)
                .or_default()
                .push(component);
        }

        Ok(subjects
            .into_iter()
            .map(|subject| {
                let components = by_subject.remove(&subject.id).unwrap_or_default();
                SubjectWithComponents {
                    subject,
                    components,
                }
            })
            .collect())
    }
}
