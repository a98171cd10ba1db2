//! Mark entry validation and percentage conversion.
//!
//! These checks run at the upload boundary. Everything downstream
//! (composite aggregation, statistics) assumes marks already passed them.

use crate::error::CoreError;

/// Upper bound accepted for a `total_possible` value.
pub const MAX_TOTAL_POSSIBLE: f64 = 1000.0;

/// Validate the denominator a teacher entered a mark out of.
pub fn validate_total_possible(total_possible: f64) -> Result<(), CoreError> {
    if !total_possible.is_finite() || total_possible <= 0.0 {
        return Err(CoreError::Validation(format!(
            "total_possible must be greater than 0, got {total_possible}"
        )));
    }
    if total_possible > MAX_TOTAL_POSSIBLE {
        return Err(CoreError::Validation(format!(
            "total_possible must be at most {MAX_TOTAL_POSSIBLE}, got {total_possible}"
        )));
    }
    Ok(())
}

/// Validate a raw mark against its maximum.
///
/// Negative marks and marks above `max` are rejected with
/// [`CoreError::MarkOutOfRange`]; nothing is clamped.
pub fn validate_raw_mark(raw_mark: f64, max: f64) -> Result<(), CoreError> {
    if !raw_mark.is_finite() {
        return Err(CoreError::Validation("Mark must be a number".into()));
    }
    if raw_mark < 0.0 || raw_mark > max {
        return Err(CoreError::MarkOutOfRange {
            raw_mark,
            min: 0.0,
            max,
        });
    }
    Ok(())
}

/// Convert a raw mark to a percentage of `total_possible`.
///
/// Callers must have validated `total_possible > 0`.
pub fn percentage(raw_mark: f64, total_possible: f64) -> f64 {
    raw_mark / total_possible * 100.0
}

/// Round to two decimal places for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn mark_within_range_accepted() {
        assert!(validate_raw_mark(0.0, 60.0).is_ok());
        assert!(validate_raw_mark(60.0, 60.0).is_ok());
        assert!(validate_raw_mark(33.5, 60.0).is_ok());
    }

    #[test]
    fn mark_above_max_rejected() {
        let err = validate_raw_mark(61.0, 60.0).unwrap_err();
        assert_eq!(err.to_string(), "Mark exceeds maximum of 60");
        assert_matches!(err, CoreError::MarkOutOfRange { max, .. } if max == 60.0);
    }

    #[test]
    fn negative_mark_rejected() {
        assert_matches!(
            validate_raw_mark(-0.5, 60.0),
            Err(CoreError::MarkOutOfRange { .. })
        );
    }

    #[test]
    fn nan_mark_rejected() {
        assert_matches!(validate_raw_mark(f64::NAN, 60.0), Err(CoreError::Validation(_)));
    }

    #[test]
    fn total_possible_bounds() {
        assert!(validate_total_possible(100.0).is_ok());
        assert!(validate_total_possible(0.0).is_err());
        assert!(validate_total_possible(-10.0).is_err());
        assert!(validate_total_possible(MAX_TOTAL_POSSIBLE + 1.0).is_err());
    }

    #[test]
    fn percentage_of_total() {
        assert!((percentage(48.0, 60.0) - 80.0).abs() < 1e-9);
        assert!((percentage(0.0, 40.0)).abs() < 1e-9);
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(56.666_666), 56.67);
        assert_eq!(round2(78.5), 78.5);
    }
}
