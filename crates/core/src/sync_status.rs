//! Terminal states of a sync run and their response codes.

use std::fmt;

use serde::Serialize;

/// HTTP-analogous code for a complete result.
pub const STATUS_OK: u16 = 200;

/// HTTP-analogous code for stale data returned after an upstream failure.
pub const STATUS_PARTIAL: u16 = 206;

/// How a sync run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// The store held nothing when the run started. Passed through on the
    /// way to one of the other states; a finished run never reports it.
    NoPriorData,
    /// Upstream holds nothing the store does not already have.
    NoNewReviews,
    /// New reviews were written.
    NewReviewsSaved,
    /// Upstream could not be reached; stored data returned instead.
    UpstreamUnavailable,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoPriorData => "no_prior_data",
            Self::NoNewReviews => "no_new_reviews",
            Self::NewReviewsSaved => "new_reviews_saved",
            Self::UpstreamUnavailable => "upstream_unavailable",
        }
    }

    pub fn status_code(self) -> u16 {
        match self {
            Self::UpstreamUnavailable => STATUS_PARTIAL,
            _ => STATUS_OK,
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable message for a sync result.
pub fn describe(status: SyncStatus, count: usize) -> String {
    match status {
        SyncStatus::NoPriorData => "No reviews stored yet".to_string(),
        SyncStatus::NoNewReviews => format!("No new reviews found; {count} stored reviews returned"),
        SyncStatus::NewReviewsSaved => format!("{count} new reviews captured and stored"),
        SyncStatus::UpstreamUnavailable => format!(
            "Review provider unavailable; returning {count} previously stored reviews"
        ),
    }
}
