//! Review identity rules and delta computation.
//!
//! A deployment picks one [`DedupStrategy`] and uses it for every sync run.
//! The identity it yields is what gets stored as `review_key` and what the
//! `UNIQUE (place_id, review_key)` constraint guards.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Lowest rating the provider can give.
pub const MIN_RATING: f64 = 0.0;

/// Highest rating the provider can give.
pub const MAX_RATING: f64 = 5.0;

/* --------------------------------------------------------------------------
Types
-------------------------------------------------------------------------- */

/// A review as normalised from the upstream provider, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub review_id: Option<String>,
    pub author_name: String,
    pub rating: f64,
    pub snippet: String,
    /// Display date as the provider renders it ("2 weeks ago").
    pub published_at: String,
    pub published_iso_at: Option<Timestamp>,
}

/// Which field identifies a review across sync runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
    /// The provider's own review identifier.
    #[default]
    ReviewId,
    /// The normalised publication timestamp. Best effort for sources that
    /// supply no identifier.
    PublishedIso,
}

impl DedupStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReviewId => "review_id",
            Self::PublishedIso => "published_iso",
        }
    }
}

impl fmt::Display for DedupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DedupStrategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "review_id" => Ok(Self::ReviewId),
            "published_iso" => Ok(Self::PublishedIso),
            other => Err(CoreError::Validation(format!(
                "Invalid dedup strategy '{other}'. Must be one of: review_id, published_iso"
            ))),
        }
    }
}

/// Result of [`compute_delta`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    /// Reviews not yet stored, in upstream order.
    pub new_reviews: Vec<NewReview>,
    /// Fetched reviews whose identity is already stored.
    pub already_stored: usize,
    /// Fetched reviews that appeared more than once in the same fetch.
    pub repeated: usize,
    /// Fetched reviews with no value for the configured identity.
    pub unidentifiable: usize,
}

/* --------------------------------------------------------------------------
Identity
-------------------------------------------------------------------------- */

/// Canonical form of a timestamp used as a review key.
///
/// Second precision, UTC, `Z` suffix, so the same instant always yields the
/// same string no matter how the provider formatted it.
pub fn canonical_iso_key(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a provider ISO-8601 date into a UTC timestamp.
pub fn parse_iso_date(raw: &str) -> Option<Timestamp> {
    chrono::DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&chrono::Utc))
}

impl NewReview {
    /// The identity of this review under `strategy`, if it has one.
    pub fn identity(&self, strategy: DedupStrategy) -> Option<String> {
        match strategy {
            DedupStrategy::ReviewId => self
                .review_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            DedupStrategy::PublishedIso => self.published_iso_at.as_ref().map(canonical_iso_key),
        }
    }
}

/// Clamp a provider rating into the accepted range, logging anything odd.
pub fn normalize_rating(raw: f64) -> f64 {
    if raw.is_nan() {
        tracing::warn!("Review rating is NaN, storing 0");
        return MIN_RATING;
    }
    if !(MIN_RATING..=MAX_RATING).contains(&raw) {
        tracing::warn!(rating = raw, "Review rating out of range, clamping");
    }
    raw.clamp(MIN_RATING, MAX_RATING)
}

/* --------------------------------------------------------------------------
Delta
-------------------------------------------------------------------------- */

/// Split freshly fetched reviews into the ones that still need storing.
///
/// `existing` holds the identities already stored for the place. Upstream
/// order is preserved; repeats inside `fetched` are kept once.
pub fn compute_delta(
    fetched: Vec<NewReview>,
    existing: &HashSet<String>,
    strategy: DedupStrategy,
) -> Delta {
    let mut delta = Delta::default();
    let mut seen: HashSet<String> = HashSet::with_capacity(fetched.len());

    for review in fetched {
        let Some(key) = review.identity(strategy) else {
            delta.unidentifiable += 1;
            continue;
        };
        if existing.contains(&key) {
            delta.already_stored += 1;
        } else if !seen.insert(key) {
            delta.repeated += 1;
        } else {
            delta.new_reviews.push(review);
        }
    }

    delta
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
