//! SerpApi client library.
//!
//! Typed response models and an HTTP wrapper for the Google Maps reviews
//! search engine.

pub mod api;
pub mod models;

pub use api::{SerpApiClient, SerpApiConfig, SerpApiError};
