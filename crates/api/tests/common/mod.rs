#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use reviewsync_api::config::ServerConfig;
use reviewsync_api::router::build_app_router;
use reviewsync_api::state::{AppState, SyncService};
use reviewsync_serpapi::{SerpApiClient, SerpApiConfig};
use reviewsync_sync::{PgReviewStore, ReviewSyncService, SyncConfig};
use sqlx::PgPool;
use tower::ServiceExt;

/// Place id registered for the `nema_leblon` context.
pub const LEBLON: &str = "ChIJF8dM_x_VmwARHGUmlUaKD5M";

/// Build a test `ServerConfig` with safe defaults and the scheduled job off.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        sync_interval_secs: 0,
        sync_force: false,
    }
}

/// Sync settings with no retries and no backoff so failure paths are fast.
pub fn test_sync_config() -> SyncConfig {
    SyncConfig {
        page_timeout: Duration::from_secs(5),
        store_timeout: Duration::from_secs(5),
        page_retries: 0,
        retry_base_delay: Duration::ZERO,
        retry_max_delay: Duration::ZERO,
        ..Default::default()
    }
}

/// A sync service backed by `pool` whose upstream is `upstream_url`.
pub fn test_sync_service(pool: PgPool, upstream_url: &str) -> Arc<SyncService> {
    sync_service_with(pool, upstream_url, test_sync_config())
}

pub fn sync_service_with(pool: PgPool, upstream_url: &str, config: SyncConfig) -> Arc<SyncService> {
    let upstream = SerpApiClient::new(SerpApiConfig {
        api_key: "test-key".to_string(),
        base_url: upstream_url.to_string(),
        language: "pt-br".to_string(),
        request_timeout_secs: 5,
    })
    .unwrap();
    let store = PgReviewStore::new(pool, config.store_timeout);
    Arc::new(ReviewSyncService::new(upstream, store, config))
}

/// Build the full application router over `pool`, talking to a review
/// provider at `upstream_url`.
pub fn build_test_app(pool: PgPool, upstream_url: &str) -> Router {
    build_app_with(pool.clone(), test_sync_service(pool, upstream_url))
}

/// Build the full application router around an already built sync service.
pub fn build_app_with(pool: PgPool, sync: Arc<SyncService>) -> Router {
    let state = AppState { pool, sync };
    build_app_router(state, &test_config())
}

pub async fn send(app: Router, method: Method, uri: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri).await
}

pub async fn post(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A one-page provider response holding `ids`, newest first, and reporting
/// `total` reviews for the place.
pub fn reviews_body(ids: &[&str], total: u64) -> String {
    let reviews: Vec<serde_json::Value> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            serde_json::json!({
                "review_id": id,
                "user": { "name": format!("author {id}") },
                "rating": 5,
                "snippet": format!("review {id}"),
                "date": "a week ago",
                "iso_date": format!("2024-05-{:02}T10:00:00Z", 28 - i),
            })
        })
        .collect();
    serde_json::json!({
        "place_info": { "title": "Nema Leblon", "reviews": total },
        "reviews": reviews,
    })
    .to_string()
}
