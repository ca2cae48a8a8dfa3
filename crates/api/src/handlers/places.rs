//! Read-only handlers for registered places and their stored reviews.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use reviewsync_core::places::{self, Place};
use reviewsync_sync::ReviewStore;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// A registered place with the number of reviews stored for it.
#[derive(Debug, Serialize)]
pub struct PlaceSummary {
    #[serde(flatten)]
    pub place: Place,
    pub stored_reviews: u64,
}

/// GET /api/v1/places
pub async fn list_places(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let store = state.sync.store();
    let mut summaries = Vec::with_capacity(places::all().len());
    for place in places::all() {
        let stored_reviews = store.count_reviews(place.place_id).await?;
        summaries.push(PlaceSummary {
            place: *place,
            stored_reviews,
        });
    }
    Ok(Json(DataResponse { data: summaries }))
}

/// GET /api/v1/places/{context}/reviews
///
/// Stored reviews only, newest first. Never contacts the review provider.
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(context): Path<String>,
) -> AppResult<impl IntoResponse> {
    let place = places::resolve(&context)?;
    let reviews = state.sync.store().list_reviews(place.place_id).await?;
    Ok(Json(DataResponse { data: reviews }))
}
