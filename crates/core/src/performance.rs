//! Performance category banding.
//!
//! A percentage maps to one of eight bands: four expectation tiers, each
//! split into two sub-levels. The cutoffs live in a [`PerformanceScale`]
//! table so they can be replaced without touching report code.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One row of the banding table.
///
/// A band covers `[min_percentage, next higher band's min)`; the top band
/// extends to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceBand {
    /// Short code, e.g. `"EE1"`.
    pub code: String,
    /// Tier label, e.g. `"Exceeding Expectation"`.
    pub label: String,
    /// Inclusive lower bound.
    pub min_percentage: f64,
    /// Rubric points awarded for this band (8 = best).
    pub points: i32,
}

/// The category assigned to a percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceCategory {
    pub code: String,
    pub label: String,
    pub points: i32,
}

/// Default 8-level rubric: `(code, label, min_percentage, points)`.
pub const DEFAULT_BANDS: &[(&str, &str, f64, i32)] = &[
    ("EE1", "Exceeding Expectation", 90.0, 8),
    ("EE2", "Exceeding Expectation", 75.0, 7),
    ("ME1", "Meeting Expectation", 58.0, 6),
    ("ME2", "Meeting Expectation", 41.0, 5),
    ("AE1", "Approaching Expectation", 31.0, 4),
    ("AE2", "Approaching Expectation", 21.0, 3),
    ("BE1", "Below Expectation", 11.0, 2),
    ("BE2", "Below Expectation", 0.0, 1),
];

/// Ordered banding table, highest band first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceScale {
    bands: Vec<PerformanceBand>,
}

impl PerformanceScale {
    /// Build a scale from arbitrary bands. Bands are sorted by
    /// `min_percentage` descending and then validated.
    pub fn new(mut bands: Vec<PerformanceBand>) -> Result<Self, CoreError> {
        bands.sort_by(|a, b| b.min_percentage.total_cmp(&a.min_percentage));
        validate_bands(&bands)?;
        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[PerformanceBand] {
        &self.bands
    }

    /// Assign the band for `percentage`. Values outside `[0, 100]` are
    /// clamped first.
    pub fn categorize(&self, percentage: f64) -> PerformanceCategory {
        let pct = if percentage.is_nan() {
            0.0
        } else {
            percentage.clamp(0.0, 100.0)
        };
        // The last band starts at 0, so a match always exists after clamping.
        let band = self
            .bands
            .iter()
            .find(|b| pct >= b.min_percentage)
            .unwrap_or(&self.bands[self.bands.len() - 1]);
        PerformanceCategory {
            code: band.code.clone(),
            label: band.label.clone(),
            points: band.points,
        }
    }
}

impl Default for PerformanceScale {
    fn default() -> Self {
        let bands = DEFAULT_BANDS
            .iter()
            .map(|(code, label, min, points)| PerformanceBand {
                code: (*code).to_string(),
                label: (*label).to_string(),
                min_percentage: *min,
                points: *points,
            })
            .collect();
        Self { bands }
    }
}

/// Validate a band table sorted by `min_percentage` descending.
///
/// Lower bounds must be strictly decreasing, lie in `[0, 100]`, and the
/// lowest must be exactly 0 so every percentage falls in exactly one band.
fn validate_bands(bands: &[PerformanceBand]) -> Result<(), CoreError> {
    let Some(last) = bands.last() else {
        return Err(CoreError::Validation(
            "Performance scale needs at least one band".into(),
        ));
    };
    if last.min_percentage != 0.0 {
        return Err(CoreError::Validation(format!(
            "Lowest performance band must start at 0, got {}",
            last.min_percentage
        )));
    }
    for band in bands {
        if !(0.0..=100.0).contains(&band.min_percentage) {
            return Err(CoreError::Validation(format!(
                "Band '{}' lower bound must be between 0 and 100, got {}",
                band.code, band.min_percentage
            )));
        }
        if band.code.trim().is_empty() {
            return Err(CoreError::Validation("Band code must not be empty".into()));
        }
    }
    for pair in bands.windows(2) {
        if pair[0].min_percentage <= pair[1].min_percentage {
            return Err(CoreError::Validation(format!(
                "Bands '{}' and '{}' overlap at {}",
                pair[0].code, pair[1].code, pair[1].min_percentage
            )));
        }
    }
    Ok(())
}

/// Assign a category using the default rubric.
pub fn assign_performance_category(percentage: f64) -> PerformanceCategory {
    PerformanceScale::default().categorize(percentage)
}
