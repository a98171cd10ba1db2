use std::sync::Arc;

use shule_core::performance::PerformanceScale;

use crate::cache::ReportCache;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or is already a handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: shule_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Computed class reports and composite results.
    pub report_cache: Arc<ReportCache>,
    /// Percentage-to-category banding used in every report.
    pub scale: Arc<PerformanceScale>,
}
