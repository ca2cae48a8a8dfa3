use std::time::Duration;

use reviewsync_core::error::CoreError;
use reviewsync_serpapi::SerpApiError;

/// Failure reaching or reading from the review provider.
///
/// Never surfaced to callers directly: the fetcher and detector turn it
/// into a stale-data outcome.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Api(#[from] SerpApiError),

    #[error("Upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Upstream repeated continuation cursor '{0}'")]
    CursorLoop(String),

    #[error("Upstream pagination exceeded {0} pages")]
    TooManyPages(u32),

    #[error("Upstream response carried no review count")]
    MissingCount,

    #[error("Upstream work exceeded the {0:?} sync deadline")]
    DeadlineExceeded(Duration),
}

impl UpstreamError {
    /// Whether another attempt at the same request could succeed.
    ///
    /// Malformed answers and exhausted budgets repeat identically, as do
    /// client errors other than rate limiting.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Api(SerpApiError::ApiError { status, .. }) => {
                *status >= 500 || *status == 408 || *status == 429
            }
            Self::Api(_) | Self::Timeout(_) => true,
            Self::CursorLoop(_) | Self::TooManyPages(_) | Self::MissingCount => false,
            Self::DeadlineExceeded(_) => false,
        }
    }
}

/// Failure talking to the review store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database cannot be reached; fatal for the current call.
    #[error("Review store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    /// A statement failed for a reason local to that statement.
    #[error("Review store query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Review store statement timed out after {0:?}")]
    Timeout(Duration),
}

impl StoreError {
    /// Classify a sqlx error by whether the store itself is reachable.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if reviewsync_db::is_connectivity_error(&err) {
            Self::Unavailable(err)
        } else {
            Self::Query(err)
        }
    }

    /// Whether the error means the store is unusable for the rest of the call.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

/// Errors that end a sync invocation.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_fatal() {
        let err = StoreError::from_sqlx(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn row_level_error_is_not_fatal() {
        let err = StoreError::from_sqlx(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Query(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn statement_timeout_is_fatal() {
        assert!(StoreError::Timeout(Duration::from_secs(1)).is_fatal());
    }

    #[test]
    fn malformed_answers_are_not_transient() {
        assert!(!UpstreamError::MissingCount.is_transient());
        assert!(!UpstreamError::CursorLoop("c".into()).is_transient());
        assert!(!UpstreamError::TooManyPages(3).is_transient());
        assert!(!UpstreamError::DeadlineExceeded(Duration::from_secs(1)).is_transient());
    }

    #[test]
    fn outages_and_timeouts_are_transient() {
        let outage = SerpApiError::ApiError {
            status: 503,
            body: String::new(),
        };
        assert!(UpstreamError::from(outage).is_transient());
        assert!(UpstreamError::Timeout(Duration::from_secs(1)).is_transient());

        let bad_key = SerpApiError::ApiError {
            status: 401,
            body: String::new(),
        };
        assert!(!UpstreamError::from(bad_key).is_transient());
    }

    #[test]
    fn upstream_error_display() {
        let err = UpstreamError::CursorLoop("abc".to_string());
        assert_eq!(err.to_string(), "Upstream repeated continuation cursor 'abc'");
        let err = UpstreamError::from(SerpApiError::Provider("quota".to_string()));
        assert_eq!(err.to_string(), "SerpApi search failed: quota");
    }
}
