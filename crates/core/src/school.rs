//! School structure constants and validation (education levels, names).

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Education levels
// ---------------------------------------------------------------------------

/// Grades 1-3.
pub const LEVEL_LOWER_PRIMARY: &str = "lower_primary";
/// Grades 4-6.
pub const LEVEL_UPPER_PRIMARY: &str = "upper_primary";
/// Grades 7-9.
pub const LEVEL_JUNIOR_SECONDARY: &str = "junior_secondary";

/// All valid education levels, in ascending order.
pub const VALID_EDUCATION_LEVELS: &[&str] = &[
    LEVEL_LOWER_PRIMARY,
    LEVEL_UPPER_PRIMARY,
    LEVEL_JUNIOR_SECONDARY,
];

/// Maximum length for display names (grades, streams, subjects, components).
pub const MAX_NAME_LENGTH: usize = 100;

/// Validate that an education level string is one of the known levels.
pub fn validate_education_level(level: &str) -> Result<(), CoreError> {
    if VALID_EDUCATION_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown education level: '{level}'. Valid levels: {}",
            VALID_EDUCATION_LEVELS.join(", ")
        )))
    }
}

/// Infer the education level for a numbered grade (1-9).
pub fn education_level_for_grade(grade_number: i32) -> Option<&'static str> {
    match grade_number {
        1..=3 => Some(LEVEL_LOWER_PRIMARY),
        4..=6 => Some(LEVEL_UPPER_PRIMARY),
        7..=9 => Some(LEVEL_JUNIOR_SECONDARY),
        _ => None,
    }
}

/// Validate a display name: non-blank after trimming and at most
/// [`MAX_NAME_LENGTH`] characters.
pub fn validate_name(value: &str, field: &str) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}
