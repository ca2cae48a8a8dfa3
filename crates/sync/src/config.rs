use std::time::Duration;

use reviewsync_core::review::DedupStrategy;

/// Tunables for one sync run.
///
/// All fields have defaults suitable for the SerpApi provider; override via
/// environment variables in production.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Identity used for deduplication. Must not change between runs.
    pub dedup: DedupStrategy,
    /// Upper bound on one upstream page or count request.
    pub page_timeout: Duration,
    /// Upper bound on one store statement.
    pub store_timeout: Duration,
    /// Extra attempts for a failed upstream request.
    pub page_retries: u32,
    /// Delay before the first retry; doubles per attempt.
    pub retry_base_delay: Duration,
    /// Cap on the retry delay.
    pub retry_max_delay: Duration,
    /// Pages after which a fetch is abandoned as runaway.
    pub max_pages: u32,
    /// Total upstream time one sync run may spend, count check and pages
    /// together. Keep it below the HTTP request timeout so a triggered sync
    /// still answers with stale data instead of being cut off.
    pub upstream_deadline: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dedup: DedupStrategy::ReviewId,
            page_timeout: Duration::from_secs(30),
            store_timeout: Duration::from_secs(10),
            page_retries: 2,
            retry_base_delay: Duration::from_secs(1),
            retry_max_delay: Duration::from_secs(8),
            max_pages: 200,
            upstream_deadline: Duration::from_secs(90),
        }
    }
}

impl SyncConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default     |
    /// |---------------------------|-------------|
    /// | `REVIEW_DEDUP_KEY`        | `review_id` |
    /// | `SYNC_PAGE_TIMEOUT_SECS`  | `30`        |
    /// | `SYNC_STORE_TIMEOUT_SECS` | `10`        |
    /// | `SYNC_PAGE_RETRIES`       | `2`         |
    /// | `SYNC_MAX_PAGES`          | `200`       |
    /// | `SYNC_DEADLINE_SECS`      | `90`        |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let dedup = match std::env::var("REVIEW_DEDUP_KEY") {
            Ok(raw) => raw
                .parse()
                .unwrap_or_else(|e| panic!("REVIEW_DEDUP_KEY is invalid: {e}")),
            Err(_) => defaults.dedup,
        };

        let page_timeout_secs: u64 = std::env::var("SYNC_PAGE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SYNC_PAGE_TIMEOUT_SECS must be a valid u64");

        let store_timeout_secs: u64 = std::env::var("SYNC_STORE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("SYNC_STORE_TIMEOUT_SECS must be a valid u64");

        let page_retries: u32 = std::env::var("SYNC_PAGE_RETRIES")
            .unwrap_or_else(|_| "2".into())
            .parse()
            .expect("SYNC_PAGE_RETRIES must be a valid u32");

        let max_pages: u32 = std::env::var("SYNC_MAX_PAGES")
            .unwrap_or_else(|_| "200".into())
            .parse()
            .expect("SYNC_MAX_PAGES must be a valid u32");

        let deadline_secs: u64 = std::env::var("SYNC_DEADLINE_SECS")
            .unwrap_or_else(|_| "90".into())
            .parse()
            .expect("SYNC_DEADLINE_SECS must be a valid u64");

        Self {
            dedup,
            page_timeout: Duration::from_secs(page_timeout_secs),
            store_timeout: Duration::from_secs(store_timeout_secs),
            page_retries,
            max_pages: max_pages.max(1),
            upstream_deadline: Duration::from_secs(deadline_secs),
            ..defaults
        }
    }
}
