//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept any Postgres executor (a `&PgPool` or a borrowed
//! `&mut PgConnection`) as the first argument.

pub mod review_repo;

pub use review_repo::ReviewRepo;
