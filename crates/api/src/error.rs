use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reviewsync_core::error::CoreError;
use reviewsync_sync::{StoreError, SyncError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps domain and sync errors and implements [`IntoResponse`] to produce
/// consistent `{ "error", "code" }` JSON bodies. Upstream failures never get
/// here; the sync service turns them into 206 outcomes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Sync(SyncError::Store(err))
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),

            AppError::Sync(SyncError::Core(core)) => classify_core_error(core),
            AppError::Sync(SyncError::Store(err)) => classify_store_error(err),

            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal_error()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::UnknownContext(context) => (
            StatusCode::BAD_REQUEST,
            "UNKNOWN_CONTEXT",
            format!("Unknown context: {context}"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
    }
}

fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %err, "Review store error");
    if err.is_fatal() {
        store_unavailable()
    } else {
        internal_error()
    }
}

fn store_unavailable() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "STORE_UNAVAILABLE",
        "Review store is unavailable".to_string(),
    )
}

fn internal_error() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
