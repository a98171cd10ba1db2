//! Composite subject aggregation.
//!
//! A composite subject (e.g. English = Grammar + Composition) is scored from
//! weighted components. Each component has a `weight` (siblings sum to 1.0)
//! and a `max_raw_mark` used as the denominator for its raw score.
//!
//! A component with no mark entered contributes 0: a partially graded
//! composite shows a deflated percentage rather than being excluded.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::school::validate_name;

/// Tolerance for the component weight sum.
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// One weighted component of a composite subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDef {
    pub name: String,
    /// Fraction of the subject total, in `(0, 1]`.
    pub weight: f64,
    /// Denominator for converting a raw score to a percentage.
    pub max_raw_mark: f64,
}

impl ComponentDef {
    pub fn new(name: impl Into<String>, weight: f64, max_raw_mark: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            max_raw_mark,
        }
    }
}

/// What a single component added to the composite percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentContribution {
    pub name: String,
    pub weight: f64,
    pub max_raw_mark: f64,
    /// `None` when no mark has been entered for this component.
    pub raw_mark: Option<f64>,
    /// Percentage points contributed to the subject total.
    pub contribution: f64,
}

/// Result of aggregating one student's component marks for a composite subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeResult {
    /// Weighted sum of component percentages, clamped to `[0, 100]`.
    pub percentage: f64,
    pub components_entered: usize,
    pub components_total: usize,
    /// Per-component breakdown in definition order.
    pub breakdown: Vec<ComponentContribution>,
}

impl CompositeResult {
    /// Every component has a mark.
    pub fn is_complete(&self) -> bool {
        self.components_entered == self.components_total
    }

    /// At least one component has a mark.
    pub fn has_any_mark(&self) -> bool {
        self.components_entered > 0
    }

    /// The percentage, or `None` when no component has been entered yet.
    pub fn entered_percentage(&self) -> Option<f64> {
        self.has_any_mark().then_some(self.percentage)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate the component set of a composite subject.
///
/// Rejects (as [`CoreError::InvalidComponentConfiguration`]):
/// - an empty component list
/// - blank or duplicate names (case-insensitive)
/// - a weight outside `(0, 1]`
/// - `max_raw_mark <= 0`
/// - weights whose sum differs from 1.0 by more than [`WEIGHT_EPSILON`]
pub fn validate_components(components: &[ComponentDef]) -> Result<(), CoreError> {
    if components.is_empty() {
        return Err(CoreError::InvalidComponentConfiguration(
            "A composite subject needs at least one component".into(),
        ));
    }

    let mut seen = HashSet::with_capacity(components.len());
    for component in components {
        validate_name(&component.name, "Component name")
            .map_err(|e| CoreError::InvalidComponentConfiguration(e.to_string()))?;

        if !seen.insert(component.name.trim().to_lowercase()) {
            return Err(CoreError::InvalidComponentConfiguration(format!(
                "Duplicate component name: '{}'",
                component.name.trim()
            )));
        }
        if !component.weight.is_finite() || component.weight <= 0.0 || component.weight > 1.0 {
            return Err(CoreError::InvalidComponentConfiguration(format!(
                "Weight of '{}' must be in (0, 1], got {}",
                component.name, component.weight
            )));
        }
        validate_max_raw_mark(component)?;
    }

    let sum: f64 = components.iter().map(|c| c.weight).sum();
    if (sum - 1.0).abs() > WEIGHT_EPSILON {
        return Err(CoreError::InvalidComponentConfiguration(format!(
            "Component weights must sum to 1.0, got {sum}"
        )));
    }
    Ok(())
}

fn validate_max_raw_mark(component: &ComponentDef) -> Result<(), CoreError> {
    if !component.max_raw_mark.is_finite() || component.max_raw_mark <= 0.0 {
        return Err(CoreError::InvalidComponentConfiguration(format!(
            "max_raw_mark of '{}' must be greater than 0, got {}",
            component.name, component.max_raw_mark
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate component raw marks into a composite result.
///
/// `marks_by_name` maps component name to the raw mark entered. Components
/// absent from the map contribute 0. Raw marks are assumed to have been
/// range-checked at upload time.
pub fn compute_composite(
    components: &[ComponentDef],
    marks_by_name: &HashMap<String, f64>,
) -> Result<CompositeResult, CoreError> {
    let mut breakdown = Vec::with_capacity(components.len());
    let mut total = 0.0;
    let mut entered = 0;

    for component in components {
        validate_max_raw_mark(component)?;

        let raw_mark = marks_by_name.get(&component.name).copied();
        let contribution = match raw_mark {
            Some(raw) => {
                entered += 1;
                raw / component.max_raw_mark * component.weight * 100.0
            }
            None => 0.0,
        };
        total += contribution;

        breakdown.push(ComponentContribution {
            name: component.name.clone(),
            weight: component.weight,
            max_raw_mark: component.max_raw_mark,
            raw_mark,
            contribution,
        });
    }

    Ok(CompositeResult {
        percentage: total.clamp(0.0, 100.0),
        components_entered: entered,
        components_total: components.len(),
        breakdown,
    })
}

/// Combined percentage for a composite subject. See [`compute_composite`].
pub fn compute_composite_percentage(
    components: &[ComponentDef],
    marks_by_name: &HashMap<String, f64>,
) -> Result<f64, CoreError> {
    compute_composite(components, marks_by_name).map(|r| r.percentage)
}
