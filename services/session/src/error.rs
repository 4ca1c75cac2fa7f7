//! Custom error types for the session guard

use thiserror::Error;

/// Reasons a credential is rejected
#[derive(Error, Debug)]
pub enum CredentialError {
    /// No credential was supplied
    #[error("Credential is missing")]
    Missing,

    /// The credential could not be decoded
    #[error("Credential is malformed: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
}

/// Custom error type for session operations
#[derive(Error, Debug)]
pub enum SessionError {
    /// The credential handed to the store is absent, malformed or expired
    #[error("Invalid credential")]
    InvalidCredential,

    /// The persisted slots could not be written
    #[error("Session storage error: {0}")]
    Storage(#[from] common::StorageError),
}

/// Type alias for session results
pub type SessionResult<T> = Result<T, SessionError>;
