//! Count-based change detection.
//!
//! Comparing the provider's total review count to the stored count is a
//! cheap proxy for "new reviews exist". It cannot see an upstream set that
//! lost and gained the same number of reviews; callers that need certainty
//! force a full fetch instead.

use serde::Serialize;

/// Whether the upstream review set grew since the last sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Growth {
    /// Upstream reports more reviews than are stored.
    Grown { upstream: u64, local: u64 },
    /// Upstream reports the same number or fewer.
    Unchanged { upstream: u64, local: u64 },
    /// The upstream count could not be obtained.
    Unknown { reason: String },
}

impl Growth {
    /// Decide growth from an upstream and a local count.
    pub fn from_counts(upstream: u64, local: u64) -> Self {
        if upstream > local {
            Self::Grown { upstream, local }
        } else {
            Self::Unchanged { upstream, local }
        }
    }

    pub fn unknown(reason: impl Into<String>) -> Self {
        Self::Unknown {
            reason: reason.into(),
        }
    }
}
