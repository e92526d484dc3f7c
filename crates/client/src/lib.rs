//! eventsync_client - HTTP event repository and CLI for eventsync.

pub mod cli;
pub mod client;
pub mod error;
pub mod output;

pub use client::{ClientConfig, EventsClient};
pub use error::{ClientError, Result};
