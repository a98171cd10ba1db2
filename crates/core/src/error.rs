use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Component weights or maxima of a composite subject are unusable.
    #[error("Invalid component configuration: {0}")]
    InvalidComponentConfiguration(String),

    /// A raw mark outside `[min, max]`.
    #[error("{}", mark_out_of_range_message(.raw_mark, .min, .max))]
    MarkOutOfRange { raw_mark: f64, min: f64, max: f64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn mark_out_of_range_message(raw_mark: &f64, min: &f64, max: &f64) -> String {
    if raw_mark < min {
        if *min == 0.0 {
            "Mark cannot be negative".to_string()
        } else {
            format!("Mark {raw_mark} is below the minimum of {min}")
        }
    } else {
        format!("Mark exceeds maximum of {max}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message_names_the_maximum() {
        let err = CoreError::MarkOutOfRange {
            raw_mark: 61.0,
            min: 0.0,
            max: 60.0,
        };
        assert_eq!(err.to_string(), "Mark exceeds maximum of 60");
    }

    #[test]
    fn negative_mark_message() {
        let err = CoreError::MarkOutOfRange {
            raw_mark: -1.0,
            min: 0.0,
            max: 40.0,
        };
        assert_eq!(err.to_string(), "Mark cannot be negative");
    }
}
