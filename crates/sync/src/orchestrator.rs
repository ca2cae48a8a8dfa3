//! Per-place synchronization state machine.
//!
//! ```text
//! Start ── list_reviews ──┬─ empty ──► NoPriorData ── fetch_all ──┬─ stale ────► UpstreamUnavailable
//!                         │                                       ├─ nothing ──► NoNewReviews
//!                         │                                       └─ reviews ──► insert ─► NewReviewsSaved
//!                         └─ stored ─► has_grown ─┬─ unknown ───► UpstreamUnavailable
//!                                                 ├─ unchanged ─► NoNewReviews
//!                                                 └─ grown ─────► fetch_all ─► delta ─► insert ─► NewReviewsSaved
//! ```
//!
//! `force` skips `has_grown` and always takes the grown branch. The count
//! check and the fetch share one upstream deadline per run; running out of
//! it is treated like any other upstream failure.

use std::collections::HashSet;

use reviewsync_core::change::Growth;
use reviewsync_core::places::{self, Place};
use reviewsync_core::review::{canonical_iso_key, compute_delta, DedupStrategy, NewReview};
use reviewsync_core::sync_status::{describe, SyncStatus};
use reviewsync_db::models::review::Review;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::SyncConfig;
use crate::detector::has_grown;
use crate::error::SyncError;
use crate::fetcher::{fetch_all, FetchOutcome};
use crate::source::ReviewSource;
use crate::store::ReviewStore;

/// Caller-supplied switches for one run.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SyncOptions {
    /// Fetch every page even when the upstream count has not grown.
    #[serde(default)]
    pub force: bool,
}

/// Result of one place sync.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub place_id: String,
    pub status: SyncStatus,
    pub count: usize,
    /// Newly stored rows for `new_reviews_saved`, otherwise the stored set.
    pub reviews: Vec<Review>,
    /// New reviews the store rejected individually.
    #[serde(skip_serializing_if = "is_zero")]
    pub failed: usize,
    pub message: String,
}

impl SyncOutcome {
    fn new(place_id: &str, status: SyncStatus, reviews: Vec<Review>) -> Self {
        let count = reviews.len();
        Self {
            place_id: place_id.to_string(),
            status,
            count,
            reviews,
            failed: 0,
            message: describe(status, count),
        }
    }

    fn with_failures(mut self, failed: usize) -> Self {
        if failed > 0 {
            self.failed = failed;
            self.message = format!("{}; {failed} could not be stored", self.message);
        }
        self
    }

    /// 200, or 206 when stale data was returned.
    pub fn status_code(&self) -> u16 {
        self.status.status_code()
    }
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

/// One entry of [`ReviewSyncService::sync_all`].
#[derive(Debug)]
pub struct PlaceSyncResult {
    pub place: &'static Place,
    pub result: Result<SyncOutcome, SyncError>,
}

/// Incremental review sync over a review source and a review store.
pub struct ReviewSyncService<S, R> {
    source: S,
    store: R,
    config: SyncConfig,
}

impl<S: ReviewSource, R: ReviewStore> ReviewSyncService<S, R> {
    pub fn new(source: S, store: R, config: SyncConfig) -> Self {
        Self {
            source,
            store,
            config,
        }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Resolve a context key and sync its place.
    pub async fn sync_context(
        &self,
        context: &str,
        options: SyncOptions,
    ) -> Result<SyncOutcome, SyncError> {
        let place = places::resolve(context)?;
        self.sync_place(place.place_id, options).await
    }

    /// Sync one place and report what happened.
    pub async fn sync_place(
        &self,
        place_id: &str,
        options: SyncOptions,
    ) -> Result<SyncOutcome, SyncError> {
        let existing = self.store.list_reviews(place_id).await?;
        let deadline = Instant::now() + self.config.upstream_deadline;

        let outcome = if existing.is_empty() {
            tracing::info!(place_id, state = %SyncStatus::NoPriorData, "Starting sync");
            self.sync_empty_place(place_id, deadline).await?
        } else {
            tracing::info!(place_id, stored = existing.len(), force = options.force, "Starting sync");
            self.sync_known_place(place_id, existing, options, deadline)
                .await?
        };

        tracing::info!(
            place_id,
            status = %outcome.status,
            count = outcome.count,
            "Sync finished",
        );
        Ok(outcome)
    }

    /// Sync every registered place in turn. One failing place does not stop
    /// the others.
    pub async fn sync_all(&self, options: SyncOptions) -> Vec<PlaceSyncResult> {
        let mut results = Vec::with_capacity(places::all().len());
        for place in places::all() {
            let result = self.sync_place(place.place_id, options).await;
            if let Err(e) = &result {
                tracing::error!(context = place.context_key, error = %e, "Place sync failed");
            }
            results.push(PlaceSyncResult { place, result });
        }
        results
    }

    /* ----------------------------------------------------------------------
    States
    ---------------------------------------------------------------------- */

    async fn sync_empty_place(
        &self,
        place_id: &str,
        deadline: Instant,
    ) -> Result<SyncOutcome, SyncError> {
        let fetched = match self.fetch(place_id, deadline).await? {
            FetchOutcome::Complete { reviews, .. } => reviews,
            FetchOutcome::Stale { fallback, .. } => {
                return Ok(SyncOutcome::new(place_id, SyncStatus::UpstreamUnavailable, fallback));
            }
        };

        if fetched.is_empty() {
            return Ok(SyncOutcome::new(place_id, SyncStatus::NoNewReviews, Vec::new()));
        }

        self.store_delta(place_id, fetched, &HashSet::new(), Vec::new())
            .await
    }

    async fn sync_known_place(
        &self,
        place_id: &str,
        existing: Vec<Review>,
        options: SyncOptions,
        deadline: Instant,
    ) -> Result<SyncOutcome, SyncError> {
        if !options.force {
            let local = existing.len() as u64;
            match has_grown(&self.source, place_id, local, &self.config, deadline).await {
                Growth::Grown { upstream, local } => {
                    tracing::info!(place_id, upstream, local, "Upstream has new reviews");
                }
                Growth::Unchanged { .. } => {
                    return Ok(SyncOutcome::new(place_id, SyncStatus::NoNewReviews, existing));
                }
                Growth::Unknown { reason } => {
                    tracing::warn!(place_id, %reason, "Could not read upstream review count");
                    return Ok(SyncOutcome::new(
                        place_id,
                        SyncStatus::UpstreamUnavailable,
                        existing,
                    ));
                }
            }
        }

        let fetched = match self.fetch(place_id, deadline).await? {
            FetchOutcome::Complete { reviews, .. } => reviews,
            FetchOutcome::Stale { fallback, .. } => {
                return Ok(SyncOutcome::new(place_id, SyncStatus::UpstreamUnavailable, fallback));
            }
        };

        let known = self.existing_identities(place_id).await?;
        self.store_delta(place_id, fetched, &known, existing).await
    }

    async fn fetch(&self, place_id: &str, deadline: Instant) -> Result<FetchOutcome, SyncError> {
        fetch_all(&self.source, &self.store, place_id, &self.config, deadline).await
    }

    /// Insert the part of `fetched` not in `known`.
    ///
    /// Reports `NoNewReviews` with the stored set only when every new review
    /// turned out to be stored already. Rows the store rejected are counted
    /// on a `NewReviewsSaved` outcome, even when none landed.
    async fn store_delta(
        &self,
        place_id: &str,
        fetched: Vec<NewReview>,
        known: &HashSet<String>,
        existing: Vec<Review>,
    ) -> Result<SyncOutcome, SyncError> {
        let fetched_count = fetched.len();
        let delta = compute_delta(fetched, known, self.config.dedup);
        tracing::debug!(
            place_id,
            fetched = fetched_count,
            new = delta.new_reviews.len(),
            already_stored = delta.already_stored,
            repeated = delta.repeated,
            unidentifiable = delta.unidentifiable,
            "Computed delta",
        );

        if delta.new_reviews.is_empty() {
            return Ok(SyncOutcome::new(place_id, SyncStatus::NoNewReviews, existing));
        }

        let report = self
            .store
            .insert_reviews(&delta.new_reviews, place_id, self.config.dedup)
            .await?;

        if report.failed > 0 {
            tracing::warn!(
                place_id,
                inserted = report.inserted_count(),
                failed = report.failed,
                "Some reviews could not be stored",
            );
        }

        if report.inserted.is_empty() && report.failed == 0 {
            // Another run stored them first.
            let current = self.store.list_reviews(place_id).await?;
            return Ok(SyncOutcome::new(place_id, SyncStatus::NoNewReviews, current));
        }

        let failed = report.failed;
        let outcome = SyncOutcome::new(place_id, SyncStatus::NewReviewsSaved, report.inserted);
        Ok(outcome.with_failures(failed))
    }

    /// Stored identities under the configured dedup strategy.
    async fn existing_identities(&self, place_id: &str) -> Result<HashSet<String>, SyncError> {
        let keys = match self.config.dedup {
            DedupStrategy::ReviewId => self.store.list_review_keys(place_id).await?,
            DedupStrategy::PublishedIso => self
                .store
                .list_published_iso_dates(place_id)
                .await?
                .iter()
                .map(canonical_iso_key)
                .collect(),
        };
        Ok(keys)
    }
}
