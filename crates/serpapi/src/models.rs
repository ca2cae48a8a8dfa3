//! Wire types for the SerpApi `google_maps_reviews` engine.
//!
//! Every field is optional or defaulted: the provider omits keys freely and
//! a missing field must not fail the whole page.

use serde::Deserialize;

/// One page of the reviews search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewsPage {
    #[serde(default)]
    pub reviews: Vec<ApiReview>,
    pub place_info: Option<PlaceInfo>,
    pub pagination: Option<Pagination>,
    pub serpapi_pagination: Option<Pagination>,
    /// Set by the provider instead of results when the search failed.
    pub error: Option<String>,
}

impl ReviewsPage {
    /// Continuation cursor for the next page, if any.
    pub fn next_page_token(&self) -> Option<&str> {
        self.serpapi_pagination
            .as_ref()
            .or(self.pagination.as_ref())
            .and_then(|p| p.next_page_token.as_deref())
            .filter(|t| !t.is_empty())
    }
}

/// A single review as returned by the provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiReview {
    pub review_id: Option<String>,
    pub user: Option<ApiUser>,
    pub rating: Option<f64>,
    pub snippet: Option<String>,
    /// Relative display date, e.g. "3 months ago".
    pub date: Option<String>,
    pub iso_date: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiUser {
    pub name: Option<String>,
    pub link: Option<String>,
}

/// Summary block describing the place itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceInfo {
    pub title: Option<String>,
    pub address: Option<String>,
    pub rating: Option<f64>,
    /// Total number of reviews the place has.
    pub reviews: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub next: Option<String>,
    pub next_page_token: Option<String>,
}
