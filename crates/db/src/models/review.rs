//! Stored review model and insert DTO.

use reviewsync_core::review::NewReview;
use reviewsync_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `reviews` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub place_id: String,
    pub review_key: String,
    pub review_id: Option<String>,
    pub author_name: String,
    pub rating: f64,
    pub snippet: String,
    pub published_at: String,
    pub published_iso_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for inserting a new review.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub place_id: String,
    pub review_key: String,
    pub review_id: Option<String>,
    pub author_name: String,
    pub rating: f64,
    pub snippet: String,
    pub published_at: String,
    pub published_iso_at: Option<Timestamp>,
}

impl CreateReview {
    /// Build an insert DTO from a normalised upstream review and the
    /// identity it was deduplicated under.
    pub fn from_new_review(place_id: &str, review_key: String, review: &NewReview) -> Self {
        Self {
            place_id: place_id.to_string(),
            review_key,
            review_id: review.review_id.clone(),
            author_name: review.author_name.clone(),
            rating: review.rating,
            snippet: review.snippet.clone(),
            published_at: review.published_at.clone(),
            published_iso_at: review.published_iso_at,
        }
    }
}
