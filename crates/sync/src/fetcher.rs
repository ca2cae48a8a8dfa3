//! Full paginated fetch with stale-data fallback.

use std::collections::HashSet;

use reviewsync_core::review::NewReview;
use reviewsync_db::models::review::Review;
use tokio::time::Instant;

use crate::config::SyncConfig;
use crate::error::{SyncError, UpstreamError};
use crate::retry::{before_deadline, with_retry};
use crate::source::ReviewSource;
use crate::store::ReviewStore;

/// Result of [`fetch_all`].
#[derive(Debug)]
pub enum FetchOutcome {
    /// Every page arrived. Reviews are in upstream order, newest first.
    Complete { reviews: Vec<NewReview>, pages: u32 },
    /// The upstream failed part way. Nothing fetched is kept; `fallback`
    /// is what the store held at the time.
    Stale { fallback: Vec<Review>, reason: String },
}

/// Fetch every review page for `place_id`.
///
/// On an upstream failure that survives the retry budget, or when
/// `deadline` passes first, the pages gathered so far are dropped and the
/// store is re-read instead. Only a store failure on that re-read is
/// returned as an error.
pub async fn fetch_all<S, R>(
    source: &S,
    store: &R,
    place_id: &str,
    config: &SyncConfig,
    deadline: Instant,
) -> Result<FetchOutcome, SyncError>
where
    S: ReviewSource,
    R: ReviewStore,
{
    let pages = fetch_pages(source, place_id, config);
    match before_deadline(deadline, config.upstream_deadline, pages).await {
        Ok((reviews, pages)) => {
            tracing::info!(place_id, pages, count = reviews.len(), "Upstream fetch complete");
            Ok(FetchOutcome::Complete { reviews, pages })
        }
        Err(e) => {
            tracing::warn!(place_id, error = %e, "Upstream fetch failed, falling back to stored reviews");
            let fallback = store.list_reviews(place_id).await?;
            Ok(FetchOutcome::Stale {
                fallback,
                reason: e.to_string(),
            })
        }
    }
}

async fn fetch_pages<S: ReviewSource>(
    source: &S,
    place_id: &str,
    config: &SyncConfig,
) -> Result<(Vec<NewReview>, u32), UpstreamError> {
    let mut reviews = Vec::new();
    let mut seen_cursors: HashSet<String> = HashSet::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0u32;

    loop {
        if pages >= config.max_pages {
            return Err(UpstreamError::TooManyPages(config.max_pages));
        }

        let page = with_retry(config, place_id, "Review page fetch", || {
            source.fetch_page(place_id, cursor.as_deref())
        })
        .await?;
        pages += 1;

        tracing::debug!(place_id, page = pages, count = page.reviews.len(), "Fetched review page");
        reviews.extend(page.reviews);

        match page.next_cursor {
            Some(next) => {
                if !seen_cursors.insert(next.clone()) {
                    return Err(UpstreamError::CursorLoop(next));
                }
                cursor = Some(next);
            }
            None => return Ok((reviews, pages)),
        }
    }
}
