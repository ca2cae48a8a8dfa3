use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{places, sync};
use crate::state::AppState;

/// Place routes mounted at `/places`.
///
/// ```text
/// GET  /                    -> list_places
/// GET  /{context}/reviews   -> list_reviews
/// POST /{context}/sync      -> trigger_sync
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(places::list_places))
        .route("/{context}/reviews", get(places::list_reviews))
        .route("/{context}/sync", post(sync::trigger_sync))
}

/// Path-parameter sync trigger mounted at `/reviews`.
///
/// ```text
/// GET /{context} -> trigger_sync
/// ```
pub fn sync_alias_router() -> Router<AppState> {
    Router::new().route("/{context}", get(sync::trigger_sync))
}
