//! Error types for the feed crate.

use thiserror::Error;

/// Errors returned by the [`ConnectionManager`](crate::ConnectionManager) handle.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The connection actor has exited; commands can no longer be delivered.
    #[error("connection actor stopped")]
    ActorStopped,
}

/// Errors from the snapshot endpoint.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Request could not be sent or the body could not be read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status.
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Response body, if any.
        message: String,
    },

    /// Body was not a JSON list of opportunities.
    #[error("invalid snapshot body: {0}")]
    Body(#[from] serde_json::Error),
}
