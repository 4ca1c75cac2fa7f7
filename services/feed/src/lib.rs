//! Optimistic feed for the snapfeed client
//!
//! Holds the two feed lists and the open post, applies likes locally before
//! the server confirms them, and rolls back the ones the server refuses.

pub mod backend;
pub mod controller;
pub mod error;
pub mod likes;
pub mod models;

pub use backend::FeedBackend;
pub use controller::{Confirmation, FeedController, PendingConfirmation};
pub use error::{FeedError, FeedResult};
pub use models::{Comment, EmbeddedLike, FeedItem, FeedLists, FeedState, LikeEntry, MediaItem};
