//! Upstream review provider seam.
//!
//! [`ReviewSource`] is what the fetcher and detector talk to. The SerpApi
//! client implements it here; tests substitute scripted sources.

use std::future::Future;

use reviewsync_core::review::{normalize_rating, parse_iso_date, NewReview};
use reviewsync_serpapi::models::{ApiReview, ReviewsPage};
use reviewsync_serpapi::SerpApiClient;

use crate::error::UpstreamError;

/// One page of normalised reviews.
#[derive(Debug, Clone, Default)]
pub struct UpstreamPage {
    pub reviews: Vec<NewReview>,
    /// Cursor for the next page; `None` on the last page.
    pub next_cursor: Option<String>,
}

/// A paginated review provider.
pub trait ReviewSource: Send + Sync {
    /// Fetch one page, newest first. `cursor` is `None` for the first page.
    fn fetch_page(
        &self,
        place_id: &str,
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<UpstreamPage, UpstreamError>> + Send;

    /// Fetch only the provider's total review count for the place.
    fn fetch_review_count(
        &self,
        place_id: &str,
    ) -> impl Future<Output = Result<u64, UpstreamError>> + Send;
}

impl ReviewSource for SerpApiClient {
    async fn fetch_page(
        &self,
        place_id: &str,
        cursor: Option<&str>,
    ) -> Result<UpstreamPage, UpstreamError> {
        let page = self.fetch_reviews_page(place_id, cursor).await?;
        Ok(normalize_page(page))
    }

    async fn fetch_review_count(&self, place_id: &str) -> Result<u64, UpstreamError> {
        let info = self.fetch_place_info(place_id).await?;
        info.reviews.ok_or(UpstreamError::MissingCount)
    }
}

/// Convert a provider page into domain reviews.
pub fn normalize_page(page: ReviewsPage) -> UpstreamPage {
    let next_cursor = page.next_page_token().map(str::to_string);
    UpstreamPage {
        reviews: page.reviews.into_iter().map(normalize_review).collect(),
        next_cursor,
    }
}

/// Convert one provider review, filling absent text fields with "".
pub fn normalize_review(api: ApiReview) -> NewReview {
    NewReview {
        review_id: api
            .review_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty()),
        author_name: api.user.and_then(|u| u.name).unwrap_or_default(),
        rating: normalize_rating(api.rating.unwrap_or_default()),
        snippet: api.snippet.unwrap_or_default(),
        published_at: api.date.unwrap_or_default(),
        published_iso_at: api.iso_date.as_deref().and_then(parse_iso_date),
    }
}
