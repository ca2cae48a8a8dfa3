//! Sync trigger handler.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use reviewsync_sync::SyncOptions;

use crate::error::{AppError, AppResult};
use crate::response::SyncResponse;
use crate::state::AppState;

/// POST /api/v1/places/{context}/sync?force=bool
/// GET  /api/v1/reviews/{context}
///
/// Runs one incremental sync and answers with its outcome. An unknown
/// context is a 400 before any I/O. The HTTP status is 206 when the
/// provider was unreachable, or too slow, and stored reviews were returned
/// instead.
pub async fn trigger_sync(
    State(state): State<AppState>,
    Path(context): Path<String>,
    Query(options): Query<SyncOptions>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.sync.sync_context(&context, options).await?;

    tracing::info!(
        %context,
        place_id = %outcome.place_id,
        status = %outcome.status,
        count = outcome.count,
        failed = outcome.failed,
        force = options.force,
        "Sync request completed",
    );

    let status = StatusCode::from_u16(outcome.status_code())
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    Ok((status, Json(SyncResponse::from(outcome))))
}
