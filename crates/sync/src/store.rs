//! Review store gateway.
//!
//! [`ReviewStore`] is the typed read/append surface the orchestrator uses.
//! [`PgReviewStore`] implements it over PostgreSQL: every operation borrows
//! exactly one pooled connection, runs each statement under a timeout, and
//! hands the connection back when the operation returns, whichever way it
//! returns.

use std::collections::{BTreeSet, HashSet};
use std::future::Future;
use std::time::Duration;

use reviewsync_core::review::{DedupStrategy, NewReview};
use reviewsync_core::types::Timestamp;
use reviewsync_db::models::review::{CreateReview, Review};
use reviewsync_db::repositories::ReviewRepo;
use reviewsync_db::DbPool;
use sqlx::pool::PoolConnection;
use sqlx::Postgres;

use crate::error::StoreError;

/// What an [`ReviewStore::insert_reviews`] call actually did.
#[derive(Debug, Clone, Default)]
pub struct InsertReport {
    /// Rows that landed, in input order.
    pub inserted: Vec<Review>,
    /// Inputs whose identity was already stored (conflict no-ops).
    pub duplicates: usize,
    /// Inputs rejected by the store for a record-level reason.
    pub failed: usize,
    /// Inputs with no value for the dedup identity.
    pub unidentifiable: usize,
}

impl InsertReport {
    pub fn inserted_count(&self) -> usize {
        self.inserted.len()
    }
}

/// Read and append operations on the persistent review set.
pub trait ReviewStore: Send + Sync {
    fn count_reviews(&self, place_id: &str)
        -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Stored reviews, newest first. Empty when none exist.
    fn list_reviews(
        &self,
        place_id: &str,
    ) -> impl Future<Output = Result<Vec<Review>, StoreError>> + Send;

    fn list_published_iso_dates(
        &self,
        place_id: &str,
    ) -> impl Future<Output = Result<BTreeSet<Timestamp>, StoreError>> + Send;

    fn list_review_keys(
        &self,
        place_id: &str,
    ) -> impl Future<Output = Result<HashSet<String>, StoreError>> + Send;

    /// Append reviews, skipping any whose identity is already stored.
    ///
    /// Best effort per record: a record-level failure is logged and
    /// counted, and the remaining records are still attempted. Only loss
    /// of the store aborts the call.
    fn insert_reviews(
        &self,
        reviews: &[NewReview],
        place_id: &str,
        dedup: DedupStrategy,
    ) -> impl Future<Output = Result<InsertReport, StoreError>> + Send;
}

/// PostgreSQL-backed [`ReviewStore`].
#[derive(Clone)]
pub struct PgReviewStore {
    pool: DbPool,
    statement_timeout: Duration,
}

impl PgReviewStore {
    pub fn new(pool: DbPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }

    /// Borrow one connection. Released when the returned guard drops.
    async fn acquire(&self) -> Result<PoolConnection<Postgres>, StoreError> {
        self.pool.acquire().await.map_err(StoreError::from_sqlx)
    }

    /// Run one statement under the statement timeout.
    async fn timed<T>(
        &self,
        statement: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.statement_timeout, statement).await {
            Ok(result) => result.map_err(StoreError::from_sqlx),
            Err(_) => Err(StoreError::Timeout(self.statement_timeout)),
        }
    }
}

impl ReviewStore for PgReviewStore {
    async fn count_reviews(&self, place_id: &str) -> Result<u64, StoreError> {
        let mut conn = self.acquire().await?;
        let count = self
            .timed(ReviewRepo::count_for_place(&mut *conn, place_id))
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn list_reviews(&self, place_id: &str) -> Result<Vec<Review>, StoreError> {
        let mut conn = self.acquire().await?;
        self.timed(ReviewRepo::list_for_place(&mut *conn, place_id))
            .await
    }

    async fn list_published_iso_dates(
        &self,
        place_id: &str,
    ) -> Result<BTreeSet<Timestamp>, StoreError> {
        let mut conn = self.acquire().await?;
        let dates = self
            .timed(ReviewRepo::list_published_iso_dates(&mut *conn, place_id))
            .await?;
        Ok(dates.into_iter().collect())
    }

    async fn list_review_keys(&self, place_id: &str) -> Result<HashSet<String>, StoreError> {
        let mut conn = self.acquire().await?;
        let keys = self
            .timed(ReviewRepo::list_review_keys(&mut *conn, place_id))
            .await?;
        Ok(keys.into_iter().collect())
    }

    async fn insert_reviews(
        &self,
        reviews: &[NewReview],
        place_id: &str,
        dedup: DedupStrategy,
    ) -> Result<InsertReport, StoreError> {
        let mut report = InsertReport::default();
        if reviews.is_empty() {
            return Ok(report);
        }

        let mut conn = self.acquire().await?;

        for review in reviews {
            let Some(key) = review.identity(dedup) else {
                tracing::warn!(place_id, dedup = %dedup, "Review has no identity, skipping");
                report.unidentifiable += 1;
                continue;
            };
            let input = CreateReview::from_new_review(place_id, key, review);

            match self
                .timed(ReviewRepo::insert_if_absent(&mut *conn, &input))
                .await
            {
                Ok(Some(row)) => {
                    tracing::debug!(place_id, review_key = %row.review_key, "Review inserted");
                    report.inserted.push(row);
                }
                Ok(None) => {
                    tracing::debug!(place_id, review_key = %input.review_key, "Review already stored, skipping");
                    report.duplicates += 1;
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!(
                        place_id,
                        inserted = report.inserted.len(),
                        error = %e,
                        "Review store lost during insert",
                    );
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(
                        place_id,
                        review_key = %input.review_key,
                        error = %e,
                        "Failed to insert review, continuing",
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}
