//! Shared query parameter types for API handlers.

use serde::Deserialize;
use shule_core::types::DbId;

use crate::error::{AppError, AppResult};

/// Term and assessment type selecting one sitting (`?term_id=&assessment_type_id=`).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AssessmentParams {
    pub term_id: DbId,
    pub assessment_type_id: DbId,
}

/// Parse a comma-separated id list such as `"3,1,2"`.
///
/// Returns the ids sorted and de-duplicated. Blank segments are ignored; an
/// unparsable segment is a 400.
pub fn parse_id_list(raw: &str) -> AppResult<Vec<DbId>> {
    let mut ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<DbId>()
                .map_err(|_| AppError::BadRequest(format!("Invalid id in list: '{s}'")))
        })
        .collect::<AppResult<Vec<DbId>>>()?;
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}
