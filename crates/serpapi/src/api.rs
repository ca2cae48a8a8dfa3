//! REST client for the SerpApi Google Maps reviews endpoint.
//!
//! Wraps `GET /search.json?engine=google_maps_reviews` using [`reqwest`].
//! Each call is one page; following cursors is the caller's job.

use std::time::Duration;

use crate::models::{PlaceInfo, ReviewsPage};

/// Search engine name for Google Maps reviews.
const ENGINE: &str = "google_maps_reviews";

/// Sort order requested from the provider.
const SORT_NEWEST_FIRST: &str = "newestFirst";

/// Provider message for a place that has no reviews at all.
const NO_RESULTS_MARKER: &str = "hasn't returned any results";

/// Connection settings for the provider.
#[derive(Debug, Clone)]
pub struct SerpApiConfig {
    /// Private API key, sent as the `api_key` query parameter.
    pub api_key: String,
    /// Base URL (default: `https://serpapi.com`).
    pub base_url: String,
    /// Review language, sent as `hl` (default: `pt-br`).
    pub language: String,
    /// Transport-level timeout per request (default: `60`).
    pub request_timeout_secs: u64,
}

impl SerpApiConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                       | Default               |
    /// |-------------------------------|-----------------------|
    /// | `SERPAPI_API_KEY`             | (required)            |
    /// | `SERPAPI_BASE_URL`            | `https://serpapi.com` |
    /// | `SERPAPI_LANGUAGE`            | `pt-br`               |
    /// | `SERPAPI_REQUEST_TIMEOUT_SECS`| `60`                  |
    pub fn from_env() -> Self {
        let api_key = std::env::var("SERPAPI_API_KEY").expect("SERPAPI_API_KEY must be set");
        let base_url = std::env::var("SERPAPI_BASE_URL")
            .unwrap_or_else(|_| "https://serpapi.com".into())
            .trim_end_matches('/')
            .to_string();
        let language = std::env::var("SERPAPI_LANGUAGE").unwrap_or_else(|_| "pt-br".into());
        let request_timeout_secs: u64 = std::env::var("SERPAPI_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("SERPAPI_REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            base_url,
            language,
            request_timeout_secs,
        }
    }
}

/// Errors from the SerpApi REST layer.
#[derive(Debug, thiserror::Error)]
pub enum SerpApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// SerpApi returned a non-2xx status code (bad key, quota, outage).
    #[error("SerpApi error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// SerpApi answered 2xx but reported a search failure in the body.
    #[error("SerpApi search failed: {0}")]
    Provider(String),
}

/// HTTP client for the reviews endpoint.
pub struct SerpApiClient {
    client: reqwest::Client,
    config: SerpApiConfig,
}

impl SerpApiClient {
    /// Create a client with its own connection pool and request timeout.
    pub fn new(config: SerpApiConfig) -> Result<Self, SerpApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: SerpApiConfig) -> Self {
        Self { client, config }
    }

    /// Fetch one page of reviews for a place, newest first.
    ///
    /// Pass the previous page's `next_page_token` to continue; `None`
    /// requests the first page. A place with no reviews yields an empty
    /// page rather than an error.
    pub async fn fetch_reviews_page(
        &self,
        place_id: &str,
        next_page_token: Option<&str>,
    ) -> Result<ReviewsPage, SerpApiError> {
        let mut params: Vec<(&str, &str)> = vec![
            ("engine", ENGINE),
            ("place_id", place_id),
            ("hl", self.config.language.as_str()),
            ("sort_by", SORT_NEWEST_FIRST),
            ("api_key", self.config.api_key.as_str()),
        ];
        if let Some(token) = next_page_token {
            params.push(("next_page_token", token));
        }

        tracing::debug!(
            place_id,
            has_cursor = next_page_token.is_some(),
            "Requesting reviews page"
        );

        let response = self
            .client
            .get(format!("{}/search.json", self.config.base_url))
            .query(&params)
            .send()
            .await?;

        let page: ReviewsPage = Self::parse_response(response).await?;
        Self::check_provider_error(page)
    }

    /// Fetch the place summary (total review count, rating) without
    /// following pagination.
    pub async fn fetch_place_info(&self, place_id: &str) -> Result<PlaceInfo, SerpApiError> {
        let page = self.fetch_reviews_page(place_id, None).await?;
        Ok(page.place_info.unwrap_or_default())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`SerpApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SerpApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SerpApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SerpApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Turn an in-body `error` into [`SerpApiError::Provider`], except the
    /// "no results" answer, which is an empty page.
    fn check_provider_error(mut page: ReviewsPage) -> Result<ReviewsPage, SerpApiError> {
        match page.error.take() {
            None => Ok(page),
            Some(msg) if msg.contains(NO_RESULTS_MARKER) => Ok(ReviewsPage {
                reviews: Vec::new(),
                ..page
            }),
            Some(msg) => Err(SerpApiError::Provider(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    fn client_for(server: &mockito::Server) -> SerpApiClient {
        SerpApiClient::new(SerpApiConfig {
            api_key: "test-key".to_string(),
            base_url: server.url(),
            language: "pt-br".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn first_page_sends_expected_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("engine".into(), "google_maps_reviews".into()),
                Matcher::UrlEncoded("place_id".into(), "place-1".into()),
                Matcher::UrlEncoded("sort_by".into(), "newestFirst".into()),
                Matcher::UrlEncoded("api_key".into(), "test-key".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{
                    "place_info": { "reviews": 2 },
                    "reviews": [ { "review_id": "a" }, { "review_id": "b" } ],
                    "serpapi_pagination": { "next_page_token": "tok-2" }
                }"#,
            )
            .create_async()
            .await;

        let page = client_for(&server)
            .fetch_reviews_page("place-1", None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.reviews.len(), 2);
        assert_eq!(page.next_page_token(), Some("tok-2"));
    }

    #[tokio::test]
    async fn cursor_is_forwarded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::UrlEncoded("next_page_token".into(), "tok-2".into()))
            .with_status(200)
            .with_body(r#"{ "reviews": [ { "review_id": "c" } ] }"#)
            .create_async()
            .await;

        let page = client_for(&server)
            .fetch_reviews_page("place-1", Some("tok-2"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(page.next_page_token().is_none());
    }

    #[tokio::test]
    async fn unauthorized_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{ "error": "Invalid API key." }"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .fetch_reviews_page("place-1", None)
            .await
            .unwrap_err();

        assert!(matches!(err, SerpApiError::ApiError { status: 401, .. }));
    }

    #[tokio::test]
    async fn in_body_error_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{ "error": "Your account has run out of searches." }"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .fetch_reviews_page("place-1", None)
            .await
            .unwrap_err();

        assert!(matches!(err, SerpApiError::Provider(msg) if msg.contains("run out")));
    }

    #[tokio::test]
    async fn no_results_is_an_empty_page() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{ "error": "Google hasn't returned any results for this query." }"#)
            .create_async()
            .await;

        let page = client_for(&server)
            .fetch_reviews_page("place-1", None)
            .await
            .unwrap();

        assert!(page.reviews.is_empty());
        assert!(page.next_page_token().is_none());
    }

    #[tokio::test]
    async fn place_info_reads_review_count() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{ "place_info": { "title": "Nema", "reviews": 57 }, "reviews": [] }"#)
            .create_async()
            .await;

        let info = client_for(&server).fetch_place_info("place-1").await.unwrap();

        assert_eq!(info.reviews, Some(57));
        assert_eq!(info.title.as_deref(), Some("Nema"));
    }

    #[test]
    fn api_error_display() {
        let err = SerpApiError::ApiError {
            status: 503,
            body: "down".to_string(),
        };
        assert_eq!(err.to_string(), "SerpApi error (503): down");
    }
}
