//! Shared response envelope types for API handlers.
//!
//! Read endpoints use the `{ "data": ... }` envelope. Sync triggers use
//! [`SyncResponse`], which also carries the outcome status.

use reviewsync_core::sync_status::SyncStatus;
use reviewsync_db::models::review::Review;
use reviewsync_sync::SyncOutcome;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Body of a sync trigger response.
///
/// `status_code` repeats the HTTP status: 200, or 206 when stored data was
/// returned because the review provider could not be reached.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub status_code: u16,
    pub status: SyncStatus,
    pub message: String,
    pub data: SyncData,
}

#[derive(Debug, Serialize)]
pub struct SyncData {
    pub count: usize,
    pub reviews: Vec<Review>,
    /// New reviews the store rejected; omitted when zero.
    #[serde(skip_serializing_if = "is_zero")]
    pub failed: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl From<SyncOutcome> for SyncResponse {
    fn from(outcome: SyncOutcome) -> Self {
        Self {
            status_code: outcome.status_code(),
            status: outcome.status,
            message: outcome.message,
            data: SyncData {
                count: outcome.count,
                reviews: outcome.reviews,
                failed: outcome.failed,
            },
        }
    }
}
