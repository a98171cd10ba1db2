//! Mark upload and report services.
//!
//! Handlers stay thin; the work of validating an upload, writing it,
//! invalidating the report cache and assembling reports lives here.
//!
//! Upload rules:
//! - Component marks are out of the component's `max_raw_mark`. A
//!   `total_possible` that disagrees is rejected.
//! - Raw marks outside `[0, max]` fail with `MarkOutOfRange` before
//!   anything is written.
//! - Atomic subject marks cannot be written for a composite subject, and
//!   component marks only exist for composite subjects.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shule_core::composite::{compute_composite, ComponentContribution, CompositeResult};
use shule_core::error::CoreError;
use shule_core::marks::{percentage, round2, validate_raw_mark, validate_total_possible};
use shule_core::performance::PerformanceCategory;
use shule_core::report::{build_class_report, student_report, ClassReport, StudentReportCard};
use shule_core::types::DbId;
use shule_db::models::mark::{Mark, UpsertMark};
use shule_db::models::student::Student;
use shule_db::repositories::{
    AssessmentTypeRepo, ComponentRepo, GradeRepo, MarkRepo, StreamRepo, StudentRepo,
    SubjectRepo, TermRepo,
};
use sqlx::PgPool;
use validator::Validate;

use crate::access::MarkEntryScope;
use crate::cache::{ClassReportKey, CompositeKey, MarkScope};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::AssessmentParams;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Body of `POST /marks/component`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ComponentMarkInput {
    #[validate(range(min = 1))]
    pub student_id: DbId,
    #[validate(range(min = 1))]
    pub component_id: DbId,
    #[validate(range(min = 1))]
    pub term_id: DbId,
    #[validate(range(min = 1))]
    pub assessment_type_id: DbId,
    pub raw_mark: f64,
    /// Defaults to the component's `max_raw_mark`.
    pub total_possible: Option<f64>,
}

/// Body of `POST /marks/subject`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubjectMarkInput {
    #[validate(range(min = 1))]
    pub student_id: DbId,
    #[validate(range(min = 1))]
    pub subject_id: DbId,
    #[validate(range(min = 1))]
    pub term_id: DbId,
    #[validate(range(min = 1))]
    pub assessment_type_id: DbId,
    pub raw_mark: f64,
    pub total_possible: f64,
}

/// One row of a bulk upload. Exactly one of `subject_id` / `component_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkMarkEntry {
    pub student_id: DbId,
    pub subject_id: Option<DbId>,
    pub component_id: Option<DbId>,
    pub raw_mark: f64,
    pub total_possible: Option<f64>,
}

/// Body of `POST /marks/bulk`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BulkMarksInput {
    #[validate(range(min = 1))]
    pub term_id: DbId,
    #[validate(range(min = 1))]
    pub assessment_type_id: DbId,
    #[validate(length(min = 1))]
    pub marks: Vec<BulkMarkEntry>,
}

/// A validated mark ready to write, with the cache scope it touches.
struct PreparedMark {
    upsert: UpsertMark,
    scope: MarkScope,
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// Record one component mark of a composite subject.
pub async fn upload_component_mark(
    state: &AppState,
    actor: &AuthUser,
    input: &ComponentMarkInput,
) -> AppResult<Mark> {
    input.validate()?;
    let sitting = AssessmentParams {
        term_id: input.term_id,
        assessment_type_id: input.assessment_type_id,
    };
    ensure_sitting_exists(&state.pool, sitting).await?;
    let permissions = MarkEntryScope::load(&state.pool, actor).await?;

    let prepared = prepare_component_mark(
        &state.pool,
        &permissions,
        actor.user_id,
        sitting,
        input.student_id,
        input.component_id,
        input.raw_mark,
        input.total_possible,
    )
    .await?;

    let task_state = state.clone();
    let mark = commit_detached(async move {
        let mark = MarkRepo::upsert(&task_state.pool, &prepared.upsert).await?;
        task_state.report_cache.invalidate_for_mark(prepared.scope).await;
        Ok(mark)
    })
    .await?;

    tracing::info!(
        user_id = actor.user_id,
        student_id = mark.student_id,
        subject_id = mark.subject_id,
        component_id = ?mark.component_id,
        "Component mark recorded"
    );
    Ok(mark)
}

/// Record the mark of an atomic (non-composite) subject.
pub async fn upload_subject_mark(
    state: &AppState,
    actor: &AuthUser,
    input: &SubjectMarkInput,
) -> AppResult<Mark> {
    input.validate()?;
    let sitting = AssessmentParams {
        term_id: input.term_id,
        assessment_type_id: input.assessment_type_id,
    };
    ensure_sitting_exists(&state.pool, sitting).await?;
    let permissions = MarkEntryScope::load(&state.pool, actor).await?;

    let prepared = prepare_subject_mark(
        &state.pool,
        &permissions,
        actor.user_id,
        sitting,
        input.student_id,
        input.subject_id,
        input.raw_mark,
        input.total_possible,
    )
    .await?;

    let task_state = state.clone();
    let mark = commit_detached(async move {
        let mark = MarkRepo::upsert(&task_state.pool, &prepared.upsert).await?;
        task_state.report_cache.invalidate_for_mark(prepared.scope).await;
        Ok(mark)
    })
    .await?;

    tracing::info!(
        user_id = actor.user_id,
        student_id = mark.student_id,
        subject_id = mark.subject_id,
        "Subject mark recorded"
    );
    Ok(mark)
}

/// Validate every entry, then write all of them in one transaction.
///
/// Nothing is written if any entry fails validation or the write fails.
pub async fn upload_bulk(
    state: &AppState,
    actor: &AuthUser,
    input: &BulkMarksInput,
) -> AppResult<Vec<Mark>> {
    input.validate()?;
    if input.marks.len() > state.config.max_bulk_marks {
        return Err(AppError::BadRequest(format!(
            "At most {} marks per upload, got {}",
            state.config.max_bulk_marks,
            input.marks.len()
        )));
    }
    let sitting = AssessmentParams {
        term_id: input.term_id,
        assessment_type_id: input.assessment_type_id,
    };
    ensure_sitting_exists(&state.pool, sitting).await?;
    let permissions = MarkEntryScope::load(&state.pool, actor).await?;

    let mut prepared = Vec::with_capacity(input.marks.len());
    for (index, entry) in input.marks.iter().enumerate() {
        let result = match (entry.subject_id, entry.component_id) {
            (None, Some(component_id)) => {
                prepare_component_mark(
                    &state.pool,
                    &permissions,
                    actor.user_id,
                    sitting,
                    entry.student_id,
                    component_id,
                    entry.raw_mark,
                    entry.total_possible,
                )
                .await
            }
            (Some(subject_id), None) => {
                let total_possible = entry.total_possible.ok_or_else(|| {
                    AppError::Core(CoreError::Validation(format!(
                        "Entry {index}: total_possible is required for subject marks"
                    )))
                })?;
                prepare_subject_mark(
                    &state.pool,
                    &permissions,
                    actor.user_id,
                    sitting,
                    entry.student_id,
                    subject_id,
                    entry.raw_mark,
                    total_possible,
                )
                .await
            }
            _ => Err(AppError::Core(CoreError::Validation(format!(
                "Entry {index}: exactly one of subject_id or component_id is required"
            )))),
        };
        match result {
            Ok(p) => prepared.push(p),
            Err(e) => {
                tracing::warn!(index, student_id = entry.student_id, error = %e, "Bulk mark rejected");
                return Err(e);
            }
        }
    }

    let mut seen = HashSet::new();
    let scopes: Vec<MarkScope> = prepared
        .iter()
        .map(|p| p.scope)
        .filter(|scope| seen.insert((scope.student_id, scope.subject_id)))
        .collect();
    let upserts: Vec<UpsertMark> = prepared.into_iter().map(|p| p.upsert).collect();

    let task_state = state.clone();
    let marks = commit_detached(async move {
        let marks = MarkRepo::upsert_many(&task_state.pool, &upserts).await?;
        for scope in scopes {
            task_state.report_cache.invalidate_for_mark(scope).await;
        }
        Ok(marks)
    })
    .await?;

    tracing::info!(
        user_id = actor.user_id,
        count = marks.len(),
        term_id = sitting.term_id,
        assessment_type_id = sitting.assessment_type_id,
        "Bulk marks recorded"
    );
    Ok(marks)
}

/// Run a write together with the cache invalidation that follows it.
///
/// The work runs on its own task, so a caller dropped mid-request (client
/// disconnect, request timeout) cannot leave the write committed and the
/// cache still serving the old value.
pub async fn commit_detached<T, F>(work: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|e| AppError::InternalError(format!("Write task failed: {e}")))?
}

pub(crate) async fn ensure_sitting_exists(pool: &PgPool, sitting: AssessmentParams) -> AppResult<()> {
    TermRepo::find_by_id(pool, sitting.term_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Term",
            id: sitting.term_id,
        }))?;
    AssessmentTypeRepo::find_by_id(pool, sitting.assessment_type_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AssessmentType",
            id: sitting.assessment_type_id,
        }))?;
    Ok(())
}

async fn find_active_student(pool: &PgPool, student_id: DbId) -> AppResult<Student> {
    let student = StudentRepo::find_by_id(pool, student_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Student",
            id: student_id,
        }))?;
    if !student.is_active {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Student {student_id} is not active"
        ))));
    }
    Ok(student)
}

#[allow(clippy::too_many_arguments)]
async fn prepare_component_mark(
    pool: &PgPool,
    permissions: &MarkEntryScope,
    entered_by: DbId,
    sitting: AssessmentParams,
    student_id: DbId,
    component_id: DbId,
    raw_mark: f64,
    total_possible: Option<f64>,
) -> AppResult<PreparedMark> {
    let component = ComponentRepo::find_by_id(pool, component_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SubjectComponent",
            id: component_id,
        }))?;
    let student = find_active_student(pool, student_id).await?;
    permissions.ensure(student.stream_id, component.subject_id)?;

    let max = component.max_raw_mark;
    if let Some(total) = total_possible {
        if (total - max).abs() > f64::EPSILON {
            return Err(AppError::Core(CoreError::Validation(format!(
                "{} is marked out of {max}, got total_possible {total}",
                component.name
            ))));
        }
    }
    validate_raw_mark(raw_mark, max)?;

    Ok(PreparedMark {
        upsert: UpsertMark {
            student_id,
            subject_id: component.subject_id,
            component_id: Some(component.id),
            term_id: sitting.term_id,
            assessment_type_id: sitting.assessment_type_id,
            raw_mark,
            total_possible: max,
            percentage: percentage(raw_mark, max),
            entered_by: Some(entered_by),
        },
        scope: scope_of(&student, component.subject_id, sitting),
    })
}

#[allow(clippy::too_many_arguments)]
async fn prepare_subject_mark(
    pool: &PgPool,
    permissions: &MarkEntryScope,
    entered_by: DbId,
    sitting: AssessmentParams,
    student_id: DbId,
    subject_id: DbId,
    raw_mark: f64,
    total_possible: f64,
) -> AppResult<PreparedMark> {
    let subject = SubjectRepo::find_by_id(pool, subject_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Subject",
            id: subject_id,
        }))?;
    if subject.is_composite {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{} is a composite subject; upload its component marks instead",
            subject.name
        ))));
    }
    let student = find_active_student(pool, student_id).await?;
    permissions.ensure(student.stream_id, subject.id)?;

    validate_total_possible(total_possible)?;
    validate_raw_mark(raw_mark, total_possible)?;

    Ok(PreparedMark {
        upsert: UpsertMark {
            student_id,
            subject_id,
            component_id: None,
            term_id: sitting.term_id,
            assessment_type_id: sitting.assessment_type_id,
            raw_mark,
            total_possible,
            percentage: percentage(raw_mark, total_possible),
            entered_by: Some(entered_by),
        },
        scope: scope_of(&student, subject_id, sitting),
    })
}

fn scope_of(student: &Student, subject_id: DbId, sitting: AssessmentParams) -> MarkScope {
    MarkScope {
        student_id: student.id,
        subject_id,
        grade_id: student.grade_id,
        stream_id: student.stream_id,
        term_id: sitting.term_id,
        assessment_type_id: sitting.assessment_type_id,
    }
}

// ---------------------------------------------------------------------------
// Composite percentage
// ---------------------------------------------------------------------------

/// Response of `GET /reports/composite`.
#[derive(Debug, Clone, Serialize)]
pub struct CompositeView {
    pub student_id: DbId,
    pub subject_id: DbId,
    pub term_id: DbId,
    pub assessment_type_id: DbId,
    /// `None` until at least one component mark exists.
    pub percentage: Option<f64>,
    pub category: Option<PerformanceCategory>,
    pub is_complete: bool,
    pub components_entered: usize,
    pub components_total: usize,
    pub breakdown: Vec<ComponentContribution>,
}

/// Combined percentage of one student in one composite subject.
pub async fn get_composite_percentage(
    state: &AppState,
    key: CompositeKey,
) -> AppResult<CompositeView> {
    let result = match state.report_cache.composite(&key).await {
        Some(hit) => hit,
        None => {
            let generation = state.report_cache.generation().await;
            let computed = Arc::new(compute_composite_for(&state.pool, key).await?);
            state
                .report_cache
                .store_composite(key, Arc::clone(&computed), generation)
                .await;
            computed
        }
    };

    let percentage = result.entered_percentage();
    Ok(CompositeView {
        student_id: key.student_id,
        subject_id: key.subject_id,
        term_id: key.term_id,
        assessment_type_id: key.assessment_type_id,
        percentage: percentage.map(round2),
        category: percentage.map(|p| state.scale.categorize(p)),
        is_complete: result.is_complete(),
        components_entered: result.components_entered,
        components_total: result.components_total,
        breakdown: result
            .breakdown
            .iter()
            .map(|c| ComponentContribution {
                contribution: round2(c.contribution),
                ..c.clone()
            })
            .collect(),
    })
}

async fn compute_composite_for(pool: &PgPool, key: CompositeKey) -> AppResult<CompositeResult> {
    ensure_sitting_exists(
        pool,
        AssessmentParams {
            term_id: key.term_id,
            assessment_type_id: key.assessment_type_id,
        },
    )
    .await?;
    let subject = SubjectRepo::find_with_components(pool, key.subject_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Subject",
            id: key.subject_id,
        }))?;
    if !subject.subject.is_composite {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{} is not a composite subject",
            subject.subject.name
        ))));
    }
    StudentRepo::find_by_id(pool, key.student_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Student",
            id: key.student_id,
        }))?;

    let names: HashMap<DbId, &str> = subject
        .components
        .iter()
        .map(|c| (c.id, c.name.as_str()))
        .collect();
    let marks = MarkRepo::list_component_marks(
        pool,
        key.student_id,
        key.subject_id,
        key.term_id,
        key.assessment_type_id,
    )
    .await?;
    let marks_by_name: HashMap<String, f64> = marks
        .iter()
        .filter_map(|m| {
            let name = names.get(&m.component_id?)?;
            Some(((*name).to_string(), m.raw_mark))
        })
        .collect();

    Ok(compute_composite(&subject.component_defs(), &marks_by_name)?)
}

// ---------------------------------------------------------------------------
// Class and student reports
// ---------------------------------------------------------------------------

/// Class statistics for one grade (optionally one stream) and sitting.
///
/// A class with no students or no marks yields a report with
/// `is_empty = true` rather than an error.
pub async fn get_class_report(
    state: &AppState,
    key: ClassReportKey,
) -> AppResult<Arc<ClassReport>> {
    if let Some(hit) = state.report_cache.class_report(&key).await {
        tracing::debug!(grade_id = key.grade_id, stream_id = ?key.stream_id, "Class report cache hit");
        return Ok(hit);
    }
    let generation = state.report_cache.generation().await;
    let pool = &state.pool;

    let grade = GradeRepo::find_by_id(pool, key.grade_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Grade",
            id: key.grade_id,
        }))?;
    if let Some(stream_id) = key.stream_id {
        let stream = StreamRepo::find_by_id(pool, stream_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Stream",
                id: stream_id,
            }))?;
        if stream.grade_id != grade.id {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Stream {} does not belong to {}",
                stream.name, grade.name
            ))));
        }
    }
    ensure_sitting_exists(
        pool,
        AssessmentParams {
            term_id: key.term_id,
            assessment_type_id: key.assessment_type_id,
        },
    )
    .await?;

    let subjects =
        SubjectRepo::list_with_components(pool, &grade.education_level, key.subject_ids.as_deref())
            .await?;
    if let Some(requested) = &key.subject_ids {
        if let Some(missing) = requested
            .iter()
            .find(|id| !subjects.iter().any(|s| s.subject.id == **id))
        {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Subject {missing} is not an active subject for {}",
                grade.name
            ))));
        }
    }

    let students = StudentRepo::list_by_class(pool, grade.id, key.stream_id).await?;
    let student_ids: Vec<DbId> = students.iter().map(|s| s.id).collect();
    let subject_ids: Vec<DbId> = subjects.iter().map(|s| s.subject.id).collect();
    let marks = if student_ids.is_empty() || subject_ids.is_empty() {
        Vec::new()
    } else {
        MarkRepo::list_for_class(
            pool,
            &student_ids,
            &subject_ids,
            key.term_id,
            key.assessment_type_id,
        )
        .await?
    };

    let report = build_class_report(
        &students.iter().map(Student::to_report_student).collect::<Vec<_>>(),
        &subjects.iter().map(|s| s.to_report_subject()).collect::<Vec<_>>(),
        &marks.iter().map(Mark::to_report_mark).collect::<Vec<_>>(),
        &state.scale,
    )?;
    let report = Arc::new(report);

    tracing::info!(
        grade_id = key.grade_id,
        stream_id = ?key.stream_id,
        students = report.student_count,
        subjects = report.subjects.len(),
        is_empty = report.is_empty,
        "Class report computed"
    );
    if !state
        .report_cache
        .store_class_report(key, Arc::clone(&report), generation)
        .await
    {
        tracing::debug!("Class report went stale while computing; not cached");
    }
    Ok(report)
}

/// Report card of one student within their own stream.
pub async fn get_student_report(
    state: &AppState,
    student: &Student,
    sitting: AssessmentParams,
) -> AppResult<StudentReportCard> {
    let key = ClassReportKey {
        grade_id: student.grade_id,
        stream_id: Some(student.stream_id),
        term_id: sitting.term_id,
        assessment_type_id: sitting.assessment_type_id,
        subject_ids: None,
    };
    let report = get_class_report(state, key).await?;
    student_report(&report, student.id).ok_or(AppError::Core(CoreError::NotFound {
        entity: "Student",
        id: student.id,
    }))
}
