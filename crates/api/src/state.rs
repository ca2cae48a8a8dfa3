use std::sync::Arc;

use reviewsync_serpapi::SerpApiClient;
use reviewsync_sync::{PgReviewStore, ReviewSyncService};

/// The production sync service: SerpApi upstream, PostgreSQL store.
pub type SyncService = ReviewSyncService<SerpApiClient, PgReviewStore>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything inside is a pool handle or behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, shared with the review store.
    pub pool: reviewsync_db::DbPool,
    pub sync: Arc<SyncService>,
}
