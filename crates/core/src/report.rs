//! Class report assembly.
//!
//! Turns plain rows (students, subject definitions, marks) into a
//! [`ClassReport`] view-model: per-subject percentages with composite
//! breakdowns, subject averages, student totals, ranks and performance
//! categories. Nothing here touches persistence rows; the db layer maps its
//! rows into the input structs below.
//!
//! Values are computed at full precision and rounded to two decimals only
//! when written into the report.

use std::collections::HashMap;

use serde::Serialize;

use crate::composite::{compute_composite, ComponentContribution, ComponentDef};
use crate::error::CoreError;
use crate::marks::round2;
use crate::performance::{PerformanceCategory, PerformanceScale};
use crate::statistics::{
    compute_student_total, compute_subject_average, summarize_students, RankEntry, StudentTotals,
};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Input rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ReportStudent {
    pub id: DbId,
    pub admission_number: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportComponent {
    pub id: DbId,
    pub def: ComponentDef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSubject {
    pub id: DbId,
    pub name: String,
    pub is_composite: bool,
    /// Empty for atomic subjects.
    pub components: Vec<ReportComponent>,
}

/// A stored mark. `component_id` is set for component marks of a composite
/// subject and `None` for atomic subject marks.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMark {
    pub student_id: DbId,
    pub subject_id: DbId,
    pub component_id: Option<DbId>,
    pub raw_mark: f64,
    pub percentage: f64,
}

// ---------------------------------------------------------------------------
// Output view-models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectSummary {
    pub subject_id: DbId,
    pub name: String,
    pub is_composite: bool,
    /// Mean over students with a mark; `None` if nobody has one.
    pub average: Option<f64>,
    pub students_graded: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectScore {
    pub subject_id: DbId,
    pub subject_name: String,
    pub percentage: Option<f64>,
    pub category: Option<PerformanceCategory>,
    /// Present for composite subjects with at least one component mark.
    pub components: Option<Vec<ComponentContribution>>,
    /// `false` for a composite subject still missing component marks.
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentReportRow {
    pub student_id: DbId,
    pub admission_number: String,
    pub full_name: String,
    pub subjects: Vec<SubjectScore>,
    pub total: f64,
    pub average: Option<f64>,
    pub subjects_graded: usize,
    /// `None` for students with no marks in this report.
    pub rank: Option<u32>,
    pub category: Option<PerformanceCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassReport {
    pub subjects: Vec<SubjectSummary>,
    /// Students in rank order; unranked students last.
    pub students: Vec<StudentReportRow>,
    pub class_average: Option<f64>,
    pub class_category: Option<PerformanceCategory>,
    pub student_count: usize,
    pub ranked_count: usize,
    /// No students, or no marks for any of them.
    pub is_empty: bool,
}

/// One student's report card, extracted from a [`ClassReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentReportCard {
    #[serde(flatten)]
    pub student: StudentReportRow,
    pub class_size: usize,
    pub ranked_count: usize,
    pub class_average: Option<f64>,
    pub subject_averages: Vec<SubjectSummary>,
}

impl ClassReport {
    /// Report with no rows, for classes that have no students.
    pub fn empty(subjects: &[ReportSubject]) -> Self {
        Self {
            subjects: subjects
                .iter()
                .map(|s| SubjectSummary {
                    subject_id: s.id,
                    name: s.name.clone(),
                    is_composite: s.is_composite,
                    average: None,
                    students_graded: 0,
                })
                .collect(),
            students: Vec::new(),
            class_average: None,
            class_category: None,
            student_count: 0,
            ranked_count: 0,
            is_empty: true,
        }
    }
}

/// Extract one student's report card from their class report.
///
/// Returns `None` if the student is not part of the report.
pub fn student_report(report: &ClassReport, student_id: DbId) -> Option<StudentReportCard> {
    let row = report.students.iter().find(|s| s.student_id == student_id)?;
    Some(StudentReportCard {
        student: row.clone(),
        class_size: report.student_count,
        ranked_count: report.ranked_count,
        class_average: report.class_average,
        subject_averages: report.subjects.clone(),
    })
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Percentage of one subject for one student, with its composite breakdown.
struct ScoredSubject {
    percentage: Option<f64>,
    components: Option<Vec<ComponentContribution>>,
    is_complete: bool,
}

/// Score one subject for one student from that student's marks.
///
/// Composite subjects go through the aggregator; a composite with no
/// component marks at all counts as missing rather than 0.
fn score_subject(
    subject: &ReportSubject,
    marks: &[&ReportMark],
) -> Result<ScoredSubject, CoreError> {
    if !subject.is_composite {
        let mark = marks
            .iter()
            .find(|m| m.subject_id == subject.id && m.component_id.is_none());
        return Ok(ScoredSubject {
            percentage: mark.map(|m| m.percentage),
            components: None,
            is_complete: mark.is_some(),
        });
    }

    let names_by_id: HashMap<DbId, &str> = subject
        .components
        .iter()
        .map(|c| (c.id, c.def.name.as_str()))
        .collect();
    let marks_by_name: HashMap<String, f64> = marks
        .iter()
        .filter(|m| m.subject_id == subject.id)
        .filter_map(|m| {
            let name = names_by_id.get(&m.component_id?)?;
            Some(((*name).to_string(), m.raw_mark))
        })
        .collect();

    let defs: Vec<ComponentDef> = subject.components.iter().map(|c| c.def.clone()).collect();
    let result = compute_composite(&defs, &marks_by_name)?;

    let Some(percentage) = result.entered_percentage() else {
        return Ok(ScoredSubject {
            percentage: None,
            components: None,
            is_complete: false,
        });
    };

    let is_complete = result.is_complete();
    let breakdown = result
        .breakdown
        .into_iter()
        .map(|c| ComponentContribution {
            contribution: round2(c.contribution),
            ..c
        })
        .collect();
    Ok(ScoredSubject {
        percentage: Some(percentage),
        components: Some(breakdown),
        is_complete,
    })
}

/// Build the class report for the given students over the given subjects.
///
/// `subjects` is the report's subject selection (already filtered by the
/// caller); marks for other subjects are ignored.
pub fn build_class_report(
    students: &[ReportStudent],
    subjects: &[ReportSubject],
    marks: &[ReportMark],
    scale: &PerformanceScale,
) -> Result<ClassReport, CoreError> {
    if students.is_empty() {
        return Ok(ClassReport::empty(subjects));
    }

    let mut marks_by_student: HashMap<DbId, Vec<&ReportMark>> = HashMap::new();
    for mark in marks {
        marks_by_student.entry(mark.student_id).or_default().push(mark);
    }

    // scores[s][j] = student s, subject j
    let mut scores: Vec<Vec<ScoredSubject>> = Vec::with_capacity(students.len());
    for student in students {
        let student_marks = marks_by_student
            .get(&student.id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let row = subjects
            .iter()
            .map(|subject| score_subject(subject, student_marks))
            .collect::<Result<Vec<_>, _>>()?;
        scores.push(row);
    }

    let subject_summaries: Vec<SubjectSummary> = subjects
        .iter()
        .enumerate()
        .map(|(j, subject)| {
            let column: Vec<Option<f64>> = scores.iter().map(|row| row[j].percentage).collect();
            SubjectSummary {
                subject_id: subject.id,
                name: subject.name.clone(),
                is_composite: subject.is_composite,
                average: compute_subject_average(&column).map(round2),
                students_graded: column.iter().filter(|p| p.is_some()).count(),
            }
        })
        .collect();

    let totals: Vec<StudentTotals> = scores
        .iter()
        .map(|row| {
            let percentages: Vec<Option<f64>> = row.iter().map(|s| s.percentage).collect();
            compute_student_total(&percentages)
        })
        .collect();

    let rank_entries: Vec<RankEntry> = students
        .iter()
        .zip(&totals)
        .map(|(student, t)| RankEntry {
            student_id: student.id,
            admission_number: student.admission_number.clone(),
            totals: *t,
        })
        .collect();
    let summary = summarize_students(&rank_entries);

    let index_of: HashMap<DbId, usize> = students
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id, i))
        .collect();

    let mut rows = Vec::with_capacity(students.len());
    for ranked_student in &summary.ranking {
        let i = index_of[&ranked_student.student_id];
        let student = &students[i];
        let t = totals[i];
        let subject_scores = subjects
            .iter()
            .zip(scores[i].drain(..))
            .map(|(subject, scored)| SubjectScore {
                subject_id: subject.id,
                subject_name: subject.name.clone(),
                percentage: scored.percentage.map(round2),
                category: scored.percentage.map(|p| scale.categorize(p)),
                components: scored.components,
                is_complete: scored.is_complete,
            })
            .collect();
        rows.push(StudentReportRow {
            student_id: student.id,
            admission_number: student.admission_number.clone(),
            full_name: student.full_name.clone(),
            subjects: subject_scores,
            total: round2(t.total),
            average: t.average.map(round2),
            subjects_graded: t.subjects_graded,
            rank: ranked_student.rank,
            category: t.average.map(|a| scale.categorize(a)),
        });
    }

    Ok(ClassReport {
        subjects: subject_summaries,
        students: rows,
        class_average: summary.class_average.map(round2),
        class_category: summary.class_average.map(|a| scale.categorize(a)),
        student_count: students.len(),
        ranked_count: summary.ranked_count,
        is_empty: summary.ranked_count == 0,
    })
}
