//! Background jobs.
//!
//! Each submodule provides a long-running async function meant for
//! `tokio::spawn`, stopped through a [`tokio_util::sync::CancellationToken`].

pub mod scheduled_sync;
