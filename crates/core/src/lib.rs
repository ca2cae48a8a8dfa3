//! Domain types and pure logic for review synchronization.
//!
//! Nothing in this crate performs I/O: the place registry, review identity
//! rules, delta computation, and the change-detection decision are all plain
//! functions so the DB, upstream, and orchestration layers can share them.

pub mod change;
pub mod error;
pub mod places;
pub mod review;
pub mod sync_status;
pub mod types;
