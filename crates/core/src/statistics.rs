//! Class statistics: subject averages, student totals, class average, ranking.
//!
//! Policies:
//! - A student with no mark for a subject is excluded from that subject's
//!   average (not counted as zero).
//! - A student's total is the sum of the subjects they have marks for; the
//!   average divides by that same count.
//! - Ranking is by total, descending. Equal totals are ordered by admission
//!   number, then student id, and still receive distinct consecutive ranks.
//! - Students with no marks at all are unranked (`rank = None`) and listed
//!   after everyone who was ranked. They are also left out of the class
//!   average.

use std::cmp::Ordering;

use serde::Serialize;

use crate::types::DbId;

/// Sum and mean of one student's subject percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StudentTotals {
    pub total: f64,
    /// `None` when the student has no graded subjects.
    pub average: Option<f64>,
    pub subjects_graded: usize,
}

/// Input row for [`assign_ranks`].
#[derive(Debug, Clone, PartialEq)]
pub struct RankEntry {
    pub student_id: DbId,
    pub admission_number: String,
    pub totals: StudentTotals,
}

/// Output row of [`assign_ranks`], in rank order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedStudent {
    pub student_id: DbId,
    pub rank: Option<u32>,
}

/// Mean of the non-missing percentages for one subject.
///
/// Returns `None` when nobody in the class has a mark for it.
pub fn compute_subject_average(percentages: &[Option<f64>]) -> Option<f64> {
    mean(percentages.iter().flatten().copied())
}

/// Total and average over the subjects a student has marks for.
pub fn compute_student_total(subject_percentages: &[Option<f64>]) -> StudentTotals {
    let graded: Vec<f64> = subject_percentages.iter().flatten().copied().collect();
    let total: f64 = graded.iter().sum();
    StudentTotals {
        total,
        average: mean(graded.iter().copied()),
        subjects_graded: graded.len(),
    }
}

/// Mean of per-student averages, skipping students without marks.
pub fn compute_class_average(all_totals: &[StudentTotals]) -> Option<f64> {
    mean(all_totals.iter().filter_map(|t| t.average))
}

/// Assign ranks `1..=N` to every student with at least one graded subject.
pub fn assign_ranks(entries: &[RankEntry]) -> Vec<RankedStudent> {
    let (mut graded, mut ungraded): (Vec<&RankEntry>, Vec<&RankEntry>) = entries
        .iter()
        .partition(|e| e.totals.subjects_graded > 0);

    graded.sort_by(|a, b| {
        b.totals
            .total
            .total_cmp(&a.totals.total)
            .then_with(|| tie_break(a, b))
    });
    ungraded.sort_by(|a, b| tie_break(a, b));

    let mut ranked: Vec<RankedStudent> = graded
        .iter()
        .enumerate()
        .map(|(i, e)| RankedStudent {
            student_id: e.student_id,
            rank: Some(i as u32 + 1),
        })
        .collect();
    ranked.extend(ungraded.iter().map(|e| RankedStudent {
        student_id: e.student_id,
        rank: None,
    }));
    ranked
}

/// Ranking and class average for one class in a single pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassSummary {
    /// Rank order; unranked students last.
    pub ranking: Vec<RankedStudent>,
    pub class_average: Option<f64>,
    pub ranked_count: usize,
}

/// Rank every student and compute the class average.
pub fn summarize_students(entries: &[RankEntry]) -> ClassSummary {
    let ranking = assign_ranks(entries);
    let ranked_count = ranking.iter().filter(|r| r.rank.is_some()).count();
    let totals: Vec<StudentTotals> = entries.iter().map(|e| e.totals).collect();
    ClassSummary {
        ranking,
        class_average: compute_class_average(&totals),
        ranked_count,
    }
}

fn tie_break(a: &RankEntry, b: &RankEntry) -> Ordering {
    a.admission_number
        .cmp(&b.admission_number)
        .then_with(|| a.student_id.cmp(&b.student_id))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: DbId, adm: &str, percentages: &[Option<f64>]) -> RankEntry {
        RankEntry {
            student_id: id,
            admission_number: adm.to_string(),
            totals: compute_student_total(percentages),
        }
    }

    fn ranks(ranked: &[RankedStudent]) -> Vec<(DbId, Option<u32>)> {
        ranked.iter().map(|r| (r.student_id, r.rank)).collect()
    }

    // -- compute_subject_average ----------------------------------------------

    #[test]
    fn subject_average_excludes_missing() {
        let avg = compute_subject_average(&[Some(80.0), Some(90.0), None]).unwrap();
        assert!((avg - 85.0).abs() < 1e-9);
    }

    #[test]
    fn subject_average_with_no_marks() {
        assert_eq!(compute_subject_average(&[None, None]), None);
        assert_eq!(compute_subject_average(&[]), None);
    }

    #[test]
    fn zero_is_a_mark_not_missing() {
        let avg = compute_subject_average(&[Some(0.0), Some(60.0)]).unwrap();
        assert!((avg - 30.0).abs() < 1e-9);
    }

    // -- compute_student_total -------------------------------------------------

    #[test]
    fn student_total_and_average() {
        let t = compute_student_total(&[Some(92.0), Some(70.0), None]);
        assert!((t.total - 162.0).abs() < 1e-9);
        assert!((t.average.unwrap() - 81.0).abs() < 1e-9);
        assert_eq!(t.subjects_graded, 2);
    }

    #[test]
    fn student_without_marks() {
        let t = compute_student_total(&[None, None]);
        assert_eq!(t.total, 0.0);
        assert_eq!(t.average, None);
        assert_eq!(t.subjects_graded, 0);
    }

    // -- compute_class_average -------------------------------------------------

    #[test]
    fn class_average_is_mean_of_student_averages() {
        let totals = [
            compute_student_total(&[Some(92.0)]),
            compute_student_total(&[Some(65.0)]),
            compute_student_total(&[None]),
        ];
        let avg = compute_class_average(&totals).unwrap();
        assert!((avg - 78.5).abs() < 1e-9);
        assert_eq!(compute_class_average(&totals), compute_class_average(&totals));
    }

    #[test]
    fn class_average_of_empty_class() {
        assert_eq!(compute_class_average(&[]), None);
    }

    // -- assign_ranks ----------------------------------------------------------

    #[test]
    fn ranks_descend_by_total() {
        let entries = vec![
            entry(1, "A003", &[Some(50.0), Some(60.0)]),
            entry(2, "A001", &[Some(90.0), Some(80.0)]),
            entry(3, "A002", &[Some(70.0), Some(70.0)]),
        ];
        assert_eq!(
            ranks(&assign_ranks(&entries)),
            vec![(2, Some(1)), (3, Some(2)), (1, Some(3))]
        );
    }

    #[test]
    fn ties_broken_by_admission_number() {
        let entries = vec![
            entry(10, "B200", &[Some(75.0)]),
            entry(11, "B100", &[Some(75.0)]),
            entry(12, "B300", &[Some(80.0)]),
        ];
        assert_eq!(
            ranks(&assign_ranks(&entries)),
            vec![(12, Some(1)), (11, Some(2)), (10, Some(3))]
        );
    }

    #[test]
    fn ties_with_same_admission_number_fall_back_to_id() {
        let entries = vec![entry(7, "X", &[Some(50.0)]), entry(3, "X", &[Some(50.0)])];
        assert_eq!(
            ranks(&assign_ranks(&entries)),
            vec![(3, Some(1)), (7, Some(2))]
        );
    }

    #[test]
    fn students_without_marks_are_unranked_and_last() {
        let entries = vec![
            entry(1, "A1", &[None]),
            entry(2, "A2", &[Some(40.0)]),
            entry(3, "A0", &[None]),
        ];
        assert_eq!(
            ranks(&assign_ranks(&entries)),
            vec![(2, Some(1)), (3, None), (1, None)]
        );
    }

    // -- summarize_students ----------------------------------------------------

    #[test]
    fn summary_combines_ranking_and_average() {
        let entries = vec![
            entry(1, "A1", &[Some(92.0)]),
            entry(2, "A2", &[Some(65.0)]),
            entry(3, "A3", &[None]),
        ];
        let summary = summarize_students(&entries);
        assert_eq!(summary.ranked_count, 2);
        assert!((summary.class_average.unwrap() - 78.5).abs() < 1e-9);
        assert_eq!(
            ranks(&summary.ranking),
            vec![(1, Some(1)), (2, Some(2)), (3, None)]
        );
    }

    #[test]
    fn ranks_are_contiguous_and_monotonic() {
        let entries: Vec<RankEntry> = (0..25)
            .map(|i| {
                let pct = ((i * 37) % 101) as f64;
                entry(i, &format!("ADM{i:03}"), &[Some(pct)])
            })
            .collect();
        let ranked = assign_ranks(&entries);

        let numbers: Vec<u32> = ranked.iter().filter_map(|r| r.rank).collect();
        assert_eq!(numbers, (1..=25).collect::<Vec<u32>>());

        let total_of = |id: DbId| {
            entries
                .iter()
                .find(|e| e.student_id == id)
                .map(|e| e.totals.total)
                .unwrap()
        };
        for pair in ranked.windows(2) {
            assert!(total_of(pair[0].student_id) >= total_of(pair[1].student_id));
        }
    }
}
