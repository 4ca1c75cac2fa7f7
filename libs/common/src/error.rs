//! Custom error types for the common library
//!
//! This module defines the error types raised by the persisted storage slots
//! and the client configuration loader.

use thiserror::Error;

/// Custom error type for persisted storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error occurred while reading or writing a slot on disk
    #[error("Storage I/O error on slot '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Slot content could not be (de)serialized
    #[error("Storage serialization error on slot '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Slot key is not usable as a storage name
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// The backing store lock was poisoned by a panicking writer
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;

/// Custom error type for configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reported by the layered configuration sources
    #[error("Configuration error: {0}")]
    Source(#[from] config::ConfigError),

    /// A value was present but not acceptable
    #[error("Invalid configuration value for '{key}': {message}")]
    Invalid { key: String, message: String },
}

/// Type alias for Result with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
