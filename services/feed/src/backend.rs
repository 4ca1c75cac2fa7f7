//! Calls the feed controller needs from the server

use async_trait::async_trait;

use crate::{error::FeedResult, models::Comment};

/// Server side of the optimistic feed
#[async_trait]
pub trait FeedBackend: Send + Sync {
    /// Confirm a like by the current user
    async fn like(&self, post_id: &str) -> FeedResult<()>;

    /// Confirm an unlike by the current user
    async fn unlike(&self, post_id: &str) -> FeedResult<()>;

    /// Authoritative number of comments on a post
    async fn comment_count(&self, post_id: &str) -> FeedResult<u64>;

    /// Post a comment as the current user
    async fn post_comment(&self, post_id: &str, text: &str) -> FeedResult<Comment>;
}
