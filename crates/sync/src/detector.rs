//! Cheap upstream growth check.

use reviewsync_core::change::Growth;
use tokio::time::Instant;

use crate::config::SyncConfig;
use crate::retry::{before_deadline, with_retry};
use crate::source::ReviewSource;

/// Compare the provider's review count against `local_count`.
///
/// Issues only the summary request, never pagination. Any failure to get a
/// count before `deadline`, after retries, is [`Growth::Unknown`].
pub async fn has_grown<S: ReviewSource>(
    source: &S,
    place_id: &str,
    local_count: u64,
    config: &SyncConfig,
    deadline: Instant,
) -> Growth {
    let count = with_retry(config, place_id, "Review count fetch", || {
        source.fetch_review_count(place_id)
    });
    let upstream = match before_deadline(deadline, config.upstream_deadline, count).await {
        Ok(count) => count,
        Err(e) => return Growth::unknown(e.to_string()),
    };

    let growth = Growth::from_counts(upstream, local_count);
    if upstream < local_count {
        tracing::info!(
            place_id,
            upstream,
            local = local_count,
            "Upstream reports fewer reviews than stored",
        );
    } else {
        tracing::debug!(place_id, upstream, local = local_count, ?growth, "Growth check");
    }
    growth
}
