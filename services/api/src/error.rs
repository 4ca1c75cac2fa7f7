//! Custom error types for the API client

use feed::FeedError;
use session::SessionError;
use thiserror::Error;

/// Custom error type for the API client
#[derive(Error, Debug)]
pub enum ApiError {
    /// No valid credential, or the server refused the one presented
    #[error("Invalid credential")]
    InvalidCredential,

    /// Input refused before any network call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The request could not be sent or its response could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The configured base URL cannot carry path segments
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The login response could not be turned into a session
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::InvalidBaseUrl(e.to_string())
    }
}

impl From<ApiError> for FeedError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Validation(msg) => FeedError::Validation(msg),
            other => FeedError::Network(other.to_string()),
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
