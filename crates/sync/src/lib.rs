//! Incremental review synchronization.
//!
//! Composes the review store gateway, the upstream fetcher, and the change
//! detector into [`ReviewSyncService`], which decides per place whether a
//! fetch is needed and writes only reviews that are not stored yet.

pub mod config;
pub mod detector;
pub mod error;
pub mod fetcher;
pub mod orchestrator;
pub mod retry;
pub mod source;
pub mod store;

#[cfg(test)]
mod test_support;

pub use config::SyncConfig;
pub use error::{StoreError, SyncError, UpstreamError};
pub use orchestrator::{PlaceSyncResult, ReviewSyncService, SyncOptions, SyncOutcome};
pub use source::ReviewSource;
pub use store::{InsertReport, PgReviewStore, ReviewStore};
