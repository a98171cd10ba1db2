//! Periodic purge of dead login sessions.
//!
//! Every login opens a `user_sessions` row and logout or refresh only
//! revokes it, so expired and revoked rows are deleted on a fixed interval.

use std::time::Duration;

use shule_db::repositories::SessionRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// How often the cleanup job runs.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Run the session cleanup loop until `cancel` is triggered.
///
/// The first sweep happens immediately on start.
pub async fn run(pool: PgPool, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Session cleanup job started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = ticker.tick() => sweep(&pool).await,
        }
    }
}

async fn sweep(pool: &PgPool) {
    match SessionRepo::cleanup_expired(pool).await {
        Ok(0) => tracing::debug!("Session cleanup: nothing to purge"),
        Ok(deleted) => tracing::info!(deleted, "Session cleanup: purged dead sessions"),
        Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
    }
}
