//! Custom error types for the feed

use thiserror::Error;

/// Custom error type for feed operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeedError {
    /// The API rejected or never answered a call
    #[error("Network failure: {0}")]
    Network(String),

    /// Input was refused before any network call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No view holds the post
    #[error("Unknown post: {0}")]
    UnknownPost(String),

    /// The feed view has been disposed
    #[error("Feed view disposed")]
    Disposed,

    /// Confirmations need a Tokio runtime to run on
    #[error("No Tokio runtime to confirm the change on")]
    NoRuntime,
}

/// Type alias for feed results
pub type FeedResult<T> = Result<T, FeedError>;
