//! Feed models as served by the REST API

use chrono::{DateTime, Utc};
use common::{UserId, UserSummary};
use serde::{Deserialize, Serialize};

/// One media attachment of a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub media_type: String,
    pub url: String,
}

/// A like entry with the liker embedded as an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedLike {
    #[serde(alias = "_id")]
    pub id: UserId,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Member of a post's likes, either a bare user id or an embedded user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LikeEntry {
    Id(UserId),
    Embedded(EmbeddedLike),
}

impl LikeEntry {
    /// The liker's id, whatever the entry's shape
    pub fn id(&self) -> &str {
        match self {
            LikeEntry::Id(id) => id,
            LikeEntry::Embedded(embedded) => &embedded.id,
        }
    }
}

/// Post as shown in the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    #[serde(alias = "_id")]
    pub id: String,
    pub author: UserSummary,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub tags: Vec<UserSummary>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub likes: Vec<LikeEntry>,
    /// Derived from `likes` and the current user, never trusted from the wire
    #[serde(default)]
    pub liked_by_user: bool,
    #[serde(default)]
    pub comment_count: u64,
    pub created_at: DateTime<Utc>,
}

/// The feed as returned by `GET /post/feed`
///
/// Unviewed posts render before viewed ones; each list keeps server order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedLists {
    #[serde(default)]
    pub unviewed: Vec<FeedItem>,
    #[serde(default)]
    pub viewed: Vec<FeedItem>,
}

impl FeedLists {
    /// Items in render order
    pub fn iter(&self) -> impl Iterator<Item = &FeedItem> {
        self.unviewed.iter().chain(self.viewed.iter())
    }

    pub fn len(&self) -> usize {
        self.unviewed.len() + self.viewed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unviewed.is_empty() && self.viewed.is_empty()
    }
}

/// Everything the feed view renders: both lists and the open post, if any
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    pub lists: FeedLists,
    pub selected: Option<FeedItem>,
}

impl FeedState {
    pub fn new(lists: FeedLists) -> Self {
        Self {
            lists,
            selected: None,
        }
    }

    /// First item with the given id, in render order
    pub fn find(&self, post_id: &str) -> Option<&FeedItem> {
        self.lists
            .iter()
            .chain(self.selected.iter())
            .find(|item| item.id == post_id)
    }

    /// Every view of the given post: both lists, then the selected item
    pub(crate) fn views_mut<'a>(
        &'a mut self,
        post_id: &'a str,
    ) -> impl Iterator<Item = &'a mut FeedItem> + 'a {
        self.lists
            .unviewed
            .iter_mut()
            .chain(self.lists.viewed.iter_mut())
            .chain(self.selected.iter_mut())
            .filter(move |item| item.id == post_id)
    }
}

/// A comment on a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(alias = "_id")]
    pub id: String,
    pub user: UserSummary,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
