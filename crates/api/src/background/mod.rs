//! Background jobs spawned from `main` via `tokio::spawn`.
//!
//! Each job runs until its [`CancellationToken`](tokio_util::sync::CancellationToken)
//! is cancelled at shutdown.

pub mod session_cleanup;
