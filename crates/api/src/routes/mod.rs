pub mod health;
pub mod places;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /places                         list registered places
/// /places/{context}/reviews       stored reviews, newest first
/// /places/{context}/sync          run a sync (POST, ?force=bool)
/// /reviews/{context}              run a sync (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/places", places::router())
        .nest("/reviews", places::sync_alias_router())
}
