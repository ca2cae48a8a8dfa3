//! Periodic sync of every registered place.
//!
//! Runs [`ReviewSyncService::sync_all`] on a fixed `tokio::time::interval`.
//! The first run starts immediately.

use std::sync::Arc;
use std::time::Duration;

use reviewsync_sync::{ReviewSource, ReviewStore, ReviewSyncService, SyncOptions};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Run the scheduled sync loop until `cancel` is triggered.
///
/// A run in progress is finished before cancellation is observed.
pub async fn run<S, R>(
    service: Arc<ReviewSyncService<S, R>>,
    every: Duration,
    options: SyncOptions,
    cancel: CancellationToken,
) where
    S: ReviewSource,
    R: ReviewStore,
{
    tracing::info!(
        interval_secs = every.as_secs(),
        force = options.force,
        "Scheduled sync job started"
    );

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Scheduled sync job stopping");
                break;
            }
            _ = interval.tick() => {
                let results = service.sync_all(options).await;
                let mut failed = 0usize;
                for entry in &results {
                    match &entry.result {
                        Ok(outcome) => tracing::info!(
                            context = entry.place.context_key,
                            status = %outcome.status,
                            count = outcome.count,
                            "Scheduled sync: place done"
                        ),
                        Err(_) => failed += 1,
                    }
                }
                if failed > 0 {
                    tracing::warn!(failed, total = results.len(), "Scheduled sync: some places failed");
                } else {
                    tracing::debug!(total = results.len(), "Scheduled sync: all places done");
                }
            }
        }
    }
}
