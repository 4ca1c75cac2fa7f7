//! Optimistic feed controller
//!
//! Like and unlike are committed to the local state at once and confirmed
//! with the server afterwards on a spawned task.
//!
//! While toggles of a post are in flight the controller keeps the user's like
//! as the server last accepted it. Each toggle takes a version from a
//! counter. A confirmed toggle moves that baseline forward, unless a newer
//! toggle was already confirmed. A rejected toggle rolls every view of the
//! post back to the baseline, but only if it is the newest toggle of the
//! post. Older rejections are left to the newest one, whose rollback already
//! excludes them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use common::{Notice, NoticeSender, UserId};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::{
    backend::FeedBackend,
    error::{FeedError, FeedResult},
    likes::{self, LikeBaseline},
    models::{Comment, FeedItem, FeedLists, FeedState},
};

/// How a like confirmation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The server accepted the change; local state already matched
    Confirmed,
    /// The server rejected the change and local state was restored
    RolledBack,
    /// The server rejected the change but a newer toggle owns the post now
    Superseded,
    /// The view was disposed before the confirmation arrived
    Discarded,
}

/// Handle on an in-flight confirmation. Dropping it does not cancel it.
#[derive(Debug)]
pub struct PendingConfirmation {
    post_id: String,
    handle: JoinHandle<Confirmation>,
}

impl PendingConfirmation {
    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    /// Wait for the confirmation to settle
    pub async fn outcome(self) -> Confirmation {
        match self.handle.await {
            Ok(confirmation) => confirmation,
            Err(e) => {
                error!("Like confirmation for {} aborted: {}", self.post_id, e);
                Confirmation::Discarded
            }
        }
    }
}

/// Toggles of one post that have not all settled
struct PendingLikes {
    baseline: LikeBaseline,
    /// Versions below this belong to a feed copy that has been replaced
    first: u64,
    latest: u64,
    latest_settled: bool,
    confirmed: u64,
    outstanding: usize,
}

#[derive(Default)]
struct Shared {
    state: FeedState,
    pending: HashMap<String, PendingLikes>,
    next_version: u64,
}

struct Inner<B> {
    backend: B,
    user_id: UserId,
    shared: Mutex<Shared>,
    disposed: AtomicBool,
    notices: NoticeSender,
}

impl<B> Inner<B> {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl<B: FeedBackend> Inner<B> {
    async fn confirm_like(&self, post_id: String, was_liked: bool, version: u64) -> Confirmation {
        let result = if was_liked {
            self.backend.unlike(&post_id).await
        } else {
            self.backend.like(&post_id).await
        };

        if self.is_disposed() {
            debug!("Dropping like confirmation for {}, view disposed", post_id);
            return Confirmation::Discarded;
        }

        let mut guard = self.lock();
        let shared = &mut *guard;
        let post = match shared.pending.get_mut(&post_id) {
            Some(post) if version >= post.first => post,
            _ => {
                debug!("Like confirmation for {} belongs to a replaced feed", post_id);
                return match result {
                    Ok(()) => Confirmation::Confirmed,
                    Err(_) => Confirmation::Superseded,
                };
            }
        };

        post.outstanding -= 1;
        let is_latest = version == post.latest;
        if is_latest {
            post.latest_settled = true;
        }

        let outcome = match result {
            Ok(()) => {
                if version > post.confirmed {
                    post.confirmed = version;
                    let before = post.baseline.clone();
                    post.baseline.accept(!was_liked, &self.user_id);
                    // The newest toggle already settled, so views show the
                    // baseline and must follow the server
                    if post.latest_settled && !is_latest && post.baseline != before {
                        likes::restore_likes(
                            &mut shared.state,
                            &post_id,
                            &self.user_id,
                            &post.baseline,
                        );
                    }
                }
                Confirmation::Confirmed
            }
            Err(e) if !is_latest => {
                warn!(
                    "Ignoring failed like confirmation for {}, superseded: {}",
                    post_id, e
                );
                Confirmation::Superseded
            }
            Err(e) => {
                warn!("Like confirmation for {} failed, rolling back: {}", post_id, e);
                likes::restore_likes(&mut shared.state, &post_id, &self.user_id, &post.baseline);
                Confirmation::RolledBack
            }
        };

        if post.outstanding == 0 {
            shared.pending.remove(&post_id);
        }
        drop(guard);

        if outcome == Confirmation::RolledBack {
            let action = if was_liked { "unlike" } else { "like" };
            self.notices
                .send(Notice::error(format!("Could not {action} the post. Please try again.")));
        }
        outcome
    }

    /// Send a notice unless the view is gone
    fn notify(&self, notice: Notice) {
        if !self.is_disposed() {
            self.notices.send(notice);
        }
    }
}

/// Feed view state with optimistic likes
pub struct FeedController<B> {
    inner: Arc<Inner<B>>,
}

impl<B> Clone for FeedController<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: FeedBackend + 'static> FeedController<B> {
    /// Create an empty feed view for `user_id`
    pub fn new(backend: B, user_id: impl Into<UserId>, notices: NoticeSender) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                user_id: user_id.into(),
                shared: Mutex::new(Shared::default()),
                disposed: AtomicBool::new(false),
                notices,
            }),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.inner.user_id
    }

    /// Replace the feed with a fresh server copy
    ///
    /// Confirmations still in flight for the old copy will not roll back.
    pub fn load(&self, mut lists: FeedLists) {
        likes::derive_liked_by_user(&mut lists, &self.inner.user_id);

        let mut shared = self.inner.lock();
        let selected = shared
            .state
            .selected
            .as_ref()
            .and_then(|open| lists.iter().find(|item| item.id == open.id).cloned());
        shared.state = FeedState { lists, selected };
        shared.pending.clear();
        info!("Feed loaded with {} posts", shared.state.lists.len());
    }

    /// Snapshot of everything the view renders
    pub fn state(&self) -> FeedState {
        self.inner.lock().state.clone()
    }

    /// Items in render order
    pub fn items(&self) -> Vec<FeedItem> {
        self.inner.lock().state.lists.iter().cloned().collect()
    }

    /// Open a single post
    pub fn select(&self, post_id: &str) -> FeedResult<FeedItem> {
        let mut shared = self.inner.lock();
        let item = shared
            .state
            .lists
            .iter()
            .find(|item| item.id == post_id)
            .cloned()
            .ok_or_else(|| FeedError::UnknownPost(post_id.to_string()))?;
        shared.state.selected = Some(item.clone());
        Ok(item)
    }

    pub fn clear_selection(&self) {
        self.inner.lock().state.selected = None;
    }

    /// Whether a like confirmation for the post is still outstanding
    pub fn is_pending(&self, post_id: &str) -> bool {
        self.inner.lock().pending.contains_key(post_id)
    }

    /// Toggle the current user's like on a post
    ///
    /// The new state is visible as soon as this returns. The confirmation
    /// runs on its own task of the current Tokio runtime; the returned handle
    /// may be awaited or dropped. Without a runtime nothing changes and
    /// [`FeedError::NoRuntime`] is returned.
    pub fn toggle_like(&self, post_id: &str) -> FeedResult<PendingConfirmation> {
        if self.inner.is_disposed() {
            return Err(FeedError::Disposed);
        }
        let runtime = Handle::try_current().map_err(|_| FeedError::NoRuntime)?;

        let (was_liked, version) = {
            let mut guard = self.inner.lock();
            let shared = &mut *guard;
            let was_liked = shared
                .state
                .find(post_id)
                .map(|item| likes::is_liked_by(&item.likes, &self.inner.user_id))
                .ok_or_else(|| FeedError::UnknownPost(post_id.to_string()))?;
            let baseline =
                likes::toggle_like(&mut shared.state, post_id, &self.inner.user_id, was_liked)
                    .ok_or_else(|| FeedError::UnknownPost(post_id.to_string()))?;

            shared.next_version += 1;
            let version = shared.next_version;
            let post = shared
                .pending
                .entry(post_id.to_string())
                .or_insert_with(|| PendingLikes {
                    baseline,
                    first: version,
                    latest: version,
                    latest_settled: false,
                    confirmed: 0,
                    outstanding: 0,
                });
            post.latest = version;
            post.latest_settled = false;
            post.outstanding += 1;
            (was_liked, version)
        };
        debug!(
            "Optimistic {} of {} committed as version {}",
            if was_liked { "unlike" } else { "like" },
            post_id,
            version
        );

        let inner = Arc::clone(&self.inner);
        let owned_id = post_id.to_string();
        let handle =
            runtime.spawn(async move { inner.confirm_like(owned_id, was_liked, version).await });

        Ok(PendingConfirmation {
            post_id: post_id.to_string(),
            handle,
        })
    }

    /// Fetch the authoritative comment count and splice it into every view
    pub async fn refresh_comment_count(&self, post_id: &str) -> FeedResult<u64> {
        let count = match self.inner.backend.comment_count(post_id).await {
            Ok(count) => count,
            Err(e) => {
                error!("Failed to refresh comment count for {}: {}", post_id, e);
                self.inner.notify(Notice::error("Could not refresh comments."));
                return Err(e);
            }
        };

        if self.inner.is_disposed() {
            return Ok(count);
        }
        if !likes::set_comment_count(&mut self.inner.lock().state, post_id, count) {
            debug!("Comment count for {} arrived after the post left the feed", post_id);
        }
        Ok(count)
    }

    /// Post a comment, then refresh the post's comment count
    pub async fn post_comment(&self, post_id: &str, text: &str) -> FeedResult<Comment> {
        let text = text.trim();
        if text.is_empty() {
            self.inner
                .notices
                .send(Notice::error("Comment cannot be empty."));
            return Err(FeedError::Validation("comment is empty".to_string()));
        }

        let comment = match self.inner.backend.post_comment(post_id, text).await {
            Ok(comment) => comment,
            Err(e) => {
                error!("Failed to post comment on {}: {}", post_id, e);
                self.inner.notify(Notice::error("Could not post your comment."));
                return Err(e);
            }
        };

        // The comment is stored even if the count cannot be refreshed
        if let Err(e) = self.refresh_comment_count(post_id).await {
            warn!("Comment posted on {} but count is stale: {}", post_id, e);
        }
        Ok(comment)
    }

    /// Detach the view. Later confirmations and refreshes leave state alone
    /// and send no notices.
    pub fn dispose(&self) {
        self.inner.disposed.store(true, Ordering::SeqCst);
        debug!("Feed view disposed");
    }
}
