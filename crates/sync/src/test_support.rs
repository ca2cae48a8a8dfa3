//! Scripted upstream and in-memory store for unit tests.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use reviewsync_core::review::{DedupStrategy, NewReview};
use reviewsync_core::types::Timestamp;
use reviewsync_db::models::review::Review;
use reviewsync_serpapi::SerpApiError;

use crate::config::SyncConfig;
use crate::error::{StoreError, UpstreamError};
use crate::source::{ReviewSource, UpstreamPage};
use crate::store::{InsertReport, ReviewStore};

pub fn fast_config() -> SyncConfig {
    SyncConfig {
        page_timeout: Duration::from_secs(1),
        store_timeout: Duration::from_secs(1),
        page_retries: 1,
        retry_base_delay: Duration::ZERO,
        retry_max_delay: Duration::ZERO,
        ..Default::default()
    }
}

pub fn upstream_review(id: &str) -> NewReview {
    NewReview {
        review_id: Some(id.to_string()),
        author_name: format!("author {id}"),
        rating: 4.0,
        snippet: format!("review {id}"),
        published_at: "a week ago".to_string(),
        published_iso_at: None,
    }
}

fn day(n: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + chrono::Duration::days(n)
}

pub fn stored_review(place_id: &str, key: &str, id: i64) -> Review {
    Review {
        id,
        place_id: place_id.to_string(),
        review_key: key.to_string(),
        review_id: Some(key.to_string()),
        author_name: format!("author {key}"),
        rating: 5.0,
        snippet: format!("review {key}"),
        published_at: "a month ago".to_string(),
        published_iso_at: Some(day(id)),
        created_at: day(id),
    }
}

/* --------------------------------------------------------------------------
Scripted source
-------------------------------------------------------------------------- */

/// Serves fixed pages linked by `page-N` cursors.
pub struct FakeSource {
    pages: Vec<Vec<NewReview>>,
    /// 1-based page number from which every page request fails.
    fail_from: Option<usize>,
    count: Option<u64>,
    count_fails: bool,
    looping: bool,
    /// Latency added to every request.
    delay: Duration,
    page_calls: AtomicU32,
    count_calls: AtomicU32,
}

impl FakeSource {
    /// The reported count defaults to the total number of scripted reviews.
    pub fn with_pages(pages: Vec<Vec<NewReview>>) -> Self {
        let total = pages.iter().map(Vec::len).sum::<usize>() as u64;
        Self {
            pages,
            fail_from: None,
            count: Some(total),
            count_fails: false,
            looping: false,
            delay: Duration::ZERO,
            page_calls: AtomicU32::new(0),
            count_calls: AtomicU32::new(0),
        }
    }

    /// Every page hands back the same cursor.
    pub fn looping() -> Self {
        Self {
            looping: true,
            ..Self::with_pages(vec![vec![upstream_review("loop")]])
        }
    }

    /// Make every request for `page` and later fail.
    pub fn failing_from_page(mut self, page: usize) -> Self {
        self.fail_from = Some(page);
        self
    }

    /// `None` makes the count request fail with a missing count.
    pub fn with_count(mut self, count: Option<u64>) -> Self {
        self.count = count;
        self
    }

    /// Make the count request fail the way an outage does.
    pub fn with_failing_count(mut self) -> Self {
        self.count_fails = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn page_calls(&self) -> u32 {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn count_calls(&self) -> u32 {
        self.count_calls.load(Ordering::SeqCst)
    }

    fn scripted_failure() -> UpstreamError {
        UpstreamError::Api(SerpApiError::Provider("scripted failure".to_string()))
    }
}

impl ReviewSource for FakeSource {
    async fn fetch_page(
        &self,
        _place_id: &str,
        cursor: Option<&str>,
    ) -> Result<UpstreamPage, UpstreamError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;

        let index = match cursor {
            None => 0,
            Some(c) => c
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(Self::scripted_failure)?,
        };

        if self.fail_from.is_some_and(|from| index + 1 >= from) {
            return Err(Self::scripted_failure());
        }

        let reviews = self.pages.get(index).cloned().unwrap_or_default();
        let next_cursor = if self.looping {
            Some("page-0".to_string())
        } else if index + 1 < self.pages.len() {
            Some(format!("page-{}", index + 1))
        } else {
            None
        };

        Ok(UpstreamPage {
            reviews,
            next_cursor,
        })
    }

    async fn fetch_review_count(&self, _place_id: &str) -> Result<u64, UpstreamError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.count_fails {
            return Err(Self::scripted_failure());
        }
        self.count.ok_or(UpstreamError::MissingCount)
    }
}

/* --------------------------------------------------------------------------
In-memory store
-------------------------------------------------------------------------- */

/// Keeps rows per place and enforces `(place_id, review_key)` uniqueness.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<String, Vec<Review>>>,
    unavailable: AtomicBool,
    /// Keys whose insert fails as a per-row error.
    rejected: Mutex<HashSet<String>>,
    insert_calls: AtomicU32,
}

impl MemoryStore {
    pub fn with_reviews(place_id: &str, reviews: Vec<Review>) -> Self {
        let store = Self::default();
        store
            .rows
            .lock()
            .unwrap()
            .insert(place_id.to_string(), reviews);
        store
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn reject(&self, key: &str) {
        self.rejected.lock().unwrap().insert(key.to_string());
    }

    pub fn insert_calls(&self) -> u32 {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self, place_id: &str) -> usize {
        self.rows
            .lock()
            .unwrap()
            .get(place_id)
            .map_or(0, Vec::len)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable(sqlx::Error::PoolClosed))
        } else {
            Ok(())
        }
    }

    fn sorted(&self, place_id: &str) -> Vec<Review> {
        let mut rows = self
            .rows
            .lock()
            .unwrap()
            .get(place_id)
            .cloned()
            .unwrap_or_default();
        // Newest first, undated last.
        rows.sort_by(|a, b| {
            b.published_iso_at
                .is_some()
                .cmp(&a.published_iso_at.is_some())
                .then(b.published_iso_at.cmp(&a.published_iso_at))
                .then(b.id.cmp(&a.id))
        });
        rows
    }
}

impl ReviewStore for MemoryStore {
    async fn count_reviews(&self, place_id: &str) -> Result<u64, StoreError> {
        self.check()?;
        Ok(self.len(place_id) as u64)
    }

    async fn list_reviews(&self, place_id: &str) -> Result<Vec<Review>, StoreError> {
        self.check()?;
        Ok(self.sorted(place_id))
    }

    async fn list_published_iso_dates(
        &self,
        place_id: &str,
    ) -> Result<BTreeSet<Timestamp>, StoreError> {
        self.check()?;
        Ok(self
            .sorted(place_id)
            .into_iter()
            .filter_map(|r| r.published_iso_at)
            .collect())
    }

    async fn list_review_keys(&self, place_id: &str) -> Result<HashSet<String>, StoreError> {
        self.check()?;
        Ok(self
            .sorted(place_id)
            .into_iter()
            .map(|r| r.review_key)
            .collect())
    }

    async fn insert_reviews(
        &self,
        reviews: &[NewReview],
        place_id: &str,
        dedup: DedupStrategy,
    ) -> Result<InsertReport, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let rejected = self.rejected.lock().unwrap().clone();
        let mut report = InsertReport::default();
        let mut all = self.rows.lock().unwrap();
        let mut next_id = all.values().flatten().map(|r| r.id).max().unwrap_or(0) + 1;
        let rows = all.entry(place_id.to_string()).or_default();

        for review in reviews {
            let Some(key) = review.identity(dedup) else {
                report.unidentifiable += 1;
                continue;
            };
            if rows.iter().any(|r| r.review_key == key) {
                report.duplicates += 1;
                continue;
            }
            if rejected.contains(&key) {
                report.failed += 1;
                continue;
            }
            let row = Review {
                id: next_id,
                place_id: place_id.to_string(),
                review_key: key,
                review_id: review.review_id.clone(),
                author_name: review.author_name.clone(),
                rating: review.rating,
                snippet: review.snippet.clone(),
                published_at: review.published_at.clone(),
                published_iso_at: review.published_iso_at,
                created_at: Utc::now(),
            };
            next_id += 1;
            rows.push(row.clone());
            report.inserted.push(row);
        }

        Ok(report)
    }
}
