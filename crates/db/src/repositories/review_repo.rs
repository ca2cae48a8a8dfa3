//! Repository for the `reviews` table.

use reviewsync_core::types::Timestamp;
use sqlx::PgExecutor;

use crate::models::review::{CreateReview, Review};

/// Column list for reviews queries.
const COLUMNS: &str = "id, place_id, review_key, review_id, author_name, rating, \
    snippet, published_at, published_iso_at, created_at";

/// Read and append operations on stored reviews. Rows are never updated or
/// deleted here.
pub struct ReviewRepo;

impl ReviewRepo {
    /// Count stored reviews for a place.
    pub async fn count_for_place<'e, E: PgExecutor<'e>>(
        executor: E,
        place_id: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE place_id = $1")
            .bind(place_id)
            .fetch_one(executor)
            .await
    }

    /// List stored reviews for a place, newest first.
    ///
    /// Reviews without an ISO date sort last; ties fall back to insertion
    /// order, newest first.
    pub async fn list_for_place<'e, E: PgExecutor<'e>>(
        executor: E,
        place_id: &str,
    ) -> Result<Vec<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews
             WHERE place_id = $1
             ORDER BY published_iso_at DESC NULLS LAST, id DESC"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(place_id)
            .fetch_all(executor)
            .await
    }

    /// Distinct ISO publication dates stored for a place.
    pub async fn list_published_iso_dates<'e, E: PgExecutor<'e>>(
        executor: E,
        place_id: &str,
    ) -> Result<Vec<Timestamp>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT published_iso_at FROM reviews
             WHERE place_id = $1 AND published_iso_at IS NOT NULL",
        )
        .bind(place_id)
        .fetch_all(executor)
        .await
    }

    /// Every dedup key stored for a place.
    pub async fn list_review_keys<'e, E: PgExecutor<'e>>(
        executor: E,
        place_id: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT review_key FROM reviews WHERE place_id = $1")
            .bind(place_id)
            .fetch_all(executor)
            .await
    }

    /// Insert a review unless one with the same `(place_id, review_key)`
    /// already exists.
    ///
    /// Returns the new row, or `None` when the insert was a conflict no-op.
    pub async fn insert_if_absent<'e, E: PgExecutor<'e>>(
        executor: E,
        input: &CreateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews
                (place_id, review_key, review_id, author_name, rating,
                 snippet, published_at, published_iso_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (place_id, review_key) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(&input.place_id)
            .bind(&input.review_key)
            .bind(&input.review_id)
            .bind(&input.author_name)
            .bind(input.rating)
            .bind(&input.snippet)
            .bind(&input.published_at)
            .bind(input.published_iso_at)
            .fetch_optional(executor)
            .await
    }
}
