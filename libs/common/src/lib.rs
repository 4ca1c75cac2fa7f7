//! Common library for the snapfeed client
//!
//! This crate provides shared functionality used across the snapfeed
//! crates, including persisted storage slots, configuration, the shared user
//! model, user-visible notices and error handling.

pub mod config;
pub mod error;
pub mod models;
pub mod notice;
pub mod storage;

pub use config::ClientConfig;
pub use error::{ConfigError, StorageError, StorageResult};
pub use models::{UserId, UserSummary};
pub use notice::{Notice, NoticeLevel, NoticeReceiver, NoticeSender};
pub use storage::{FileStore, MemoryStore, SlotStore};
