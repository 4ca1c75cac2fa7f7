//! Pure like and comment-count mutations over the feed state
//!
//! Every view of a post (its entry in either list and the selected item) is
//! mutated together. `liked_by_user` is always recomputed from `likes` after
//! a mutation.

use crate::models::{FeedItem, FeedLists, FeedState, LikeEntry};

/// Whether `user_id` is among `likes`, comparing by extracted id
pub fn is_liked_by(likes: &[LikeEntry], user_id: &str) -> bool {
    likes.iter().any(|entry| entry.id() == user_id)
}

/// Recompute `liked_by_user` for every item from its likes
pub fn derive_liked_by_user(lists: &mut FeedLists, user_id: &str) {
    for item in lists.unviewed.iter_mut().chain(lists.viewed.iter_mut()) {
        item.liked_by_user = is_liked_by(&item.likes, user_id);
    }
}

/// The current user's like on a post as the server last accepted it
///
/// Rolling back means making every view of the post agree with this again,
/// so views opened after the toggle are covered too.
#[derive(Debug, Clone, PartialEq)]
pub enum LikeBaseline {
    NotLiked,
    /// `position` is where the entry sat in `likes`; `None` appends it
    Liked {
        position: Option<usize>,
        entry: LikeEntry,
    },
}

impl LikeBaseline {
    /// Read the user's like from one view of a post
    pub fn capture(item: &FeedItem, user_id: &str) -> Self {
        item.likes
            .iter()
            .position(|entry| entry.id() == user_id)
            .map_or(LikeBaseline::NotLiked, |position| LikeBaseline::Liked {
                position: Some(position),
                entry: item.likes[position].clone(),
            })
    }

    pub fn is_liked(&self) -> bool {
        matches!(self, LikeBaseline::Liked { .. })
    }

    /// Record that the server accepted a like (`liked`) or an unlike
    ///
    /// An existing entry is kept when the server accepts a like again.
    pub fn accept(&mut self, liked: bool, user_id: &str) {
        match (liked, self.is_liked()) {
            (true, false) => {
                *self = LikeBaseline::Liked {
                    position: None,
                    entry: LikeEntry::Id(user_id.to_string()),
                }
            }
            (false, true) => *self = LikeBaseline::NotLiked,
            _ => {}
        }
    }
}

fn flip(item: &mut FeedItem, user_id: &str, was_liked: bool) {
    if was_liked {
        item.likes.retain(|entry| entry.id() != user_id);
    } else if !is_liked_by(&item.likes, user_id) {
        item.likes.push(LikeEntry::Id(user_id.to_string()));
    }
    item.liked_by_user = is_liked_by(&item.likes, user_id);
}

/// Flip `user_id`'s membership in the likes of every view of `post_id`
///
/// `was_liked` chooses the direction: `true` removes the user, `false` adds
/// them. Returns the user's like as it stood before the flip, or `None` when
/// no view holds the post.
pub fn toggle_like(
    state: &mut FeedState,
    post_id: &str,
    user_id: &str,
    was_liked: bool,
) -> Option<LikeBaseline> {
    let baseline = state
        .find(post_id)
        .map(|item| LikeBaseline::capture(item, user_id))?;
    for item in state.views_mut(post_id) {
        flip(item, user_id, was_liked);
    }
    Some(baseline)
}

/// Make `user_id`'s membership in every view of `post_id` match `baseline`
///
/// Other likers are left alone. A restored entry goes back to its old
/// position with its old shape.
pub fn restore_likes(
    state: &mut FeedState,
    post_id: &str,
    user_id: &str,
    baseline: &LikeBaseline,
) {
    for item in state.views_mut(post_id) {
        item.likes.retain(|entry| entry.id() != user_id);
        if let LikeBaseline::Liked { position, entry } = baseline {
            let at = position.map_or(item.likes.len(), |p| p.min(item.likes.len()));
            item.likes.insert(at, entry.clone());
        }
        item.liked_by_user = is_liked_by(&item.likes, user_id);
    }
}

/// Splice an authoritative comment count into every view of `post_id`
///
/// Returns whether any view was updated.
pub fn set_comment_count(state: &mut FeedState, post_id: &str, count: u64) -> bool {
    let mut updated = false;
    for item in state.views_mut(post_id) {
        item.comment_count = count;
        updated = true;
    }
    updated
}
