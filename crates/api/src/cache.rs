//! In-memory cache of computed reports.
//!
//! Class reports and composite results are pure functions of the marks and
//! subject definitions, so they are cached until a write touches their
//! inputs. Every write bumps a generation counter; a report computed under
//! an older generation is dropped instead of stored, so a slow read racing
//! a mark upload can never re-insert stale data.

use std::collections::HashMap;
use std::sync::Arc;

use shule_core::composite::CompositeResult;
use shule_core::report::ClassReport;
use shule_core::types::DbId;
use tokio::sync::RwLock;

/// Identifies one class report.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassReportKey {
    pub grade_id: DbId,
    /// `None` covers every stream of the grade.
    pub stream_id: Option<DbId>,
    pub term_id: DbId,
    pub assessment_type_id: DbId,
    /// Sorted subject filter; `None` means every active subject of the level.
    pub subject_ids: Option<Vec<DbId>>,
}

/// Identifies one student's composite result for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    pub student_id: DbId,
    pub subject_id: DbId,
    pub term_id: DbId,
    pub assessment_type_id: DbId,
}

/// Where a written mark lands: enough to find every cached entry it affects.
#[derive(Debug, Clone, Copy)]
pub struct MarkScope {
    pub student_id: DbId,
    pub subject_id: DbId,
    pub grade_id: DbId,
    pub stream_id: DbId,
    pub term_id: DbId,
    pub assessment_type_id: DbId,
}

#[derive(Default)]
struct CacheInner {
    generation: u64,
    class_reports: HashMap<ClassReportKey, Arc<ClassReport>>,
    composites: HashMap<CompositeKey, Arc<CompositeResult>>,
}

/// Report cache shared through [`AppState`](crate::state::AppState).
///
/// Thread-safe via interior `RwLock`; wrap in `Arc` to share.
#[derive(Default)]
pub struct ReportCache {
    inner: RwLock<CacheInner>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation. Read it before computing a report and pass it
    /// to the matching `store_*` call.
    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation
    }

    pub async fn class_report(&self, key: &ClassReportKey) -> Option<Arc<ClassReport>> {
        self.inner.read().await.class_reports.get(key).cloned()
    }

    /// Store a class report computed at `generation`. Returns `false` (and
    /// stores nothing) if an invalidation happened in between.
    pub async fn store_class_report(
        &self,
        key: ClassReportKey,
        report: Arc<ClassReport>,
        generation: u64,
    ) -> bool {
        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            return false;
        }
        inner.class_reports.insert(key, report);
        true
    }

    pub async fn composite(&self, key: &CompositeKey) -> Option<Arc<CompositeResult>> {
        self.inner.read().await.composites.get(key).cloned()
    }

    /// Store a composite result computed at `generation`. Same rules as
    /// [`store_class_report`](Self::store_class_report).
    pub async fn store_composite(
        &self,
        key: CompositeKey,
        result: Arc<CompositeResult>,
        generation: u64,
    ) -> bool {
        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            return false;
        }
        inner.composites.insert(key, result);
        true
    }

    /// Drop everything a mark write can affect: class reports of the
    /// student's grade (whole-grade or same stream) for that sitting, and
    /// the student's composite for that subject.
    pub async fn invalidate_for_mark(&self, scope: MarkScope) {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        inner.class_reports.retain(|key, _| {
            !(key.grade_id == scope.grade_id
                && key.stream_id.map_or(true, |s| s == scope.stream_id)
                && key.term_id == scope.term_id
                && key.assessment_type_id == scope.assessment_type_id)
        });
        inner.composites.remove(&CompositeKey {
            student_id: scope.student_id,
            subject_id: scope.subject_id,
            term_id: scope.term_id,
            assessment_type_id: scope.assessment_type_id,
        });
        tracing::debug!(
            student_id = scope.student_id,
            subject_id = scope.subject_id,
            generation = inner.generation,
            "Report cache invalidated for mark"
        );
    }

    /// Drop every cached entry. Used when subjects, components,
    /// enrolment or a student's name change.
    pub async fn invalidate_all(&self) {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        inner.class_reports.clear();
        inner.composites.clear();
        tracing::debug!(generation = inner.generation, "Report cache cleared");
    }

    /// Number of cached entries (class reports + composites).
    pub async fn len(&self) -> usize {
        let inner = self.inner.read().await;
        inner.class_reports.len() + inner.composites.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
