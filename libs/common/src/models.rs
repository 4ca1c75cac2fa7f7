//! Models shared by the session guard, the feed and the API client

use serde::{Deserialize, Serialize};

/// Identifier of a user as issued by the server
pub type UserId = String;

/// Summary of a user, mirrored from the server and cached for fast startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub username: String,
    #[serde(rename = "profileImageURL", default)]
    pub profile_image_url: Option<String>,
    #[serde(rename = "isVerified", default)]
    pub is_verified: bool,
    #[serde(default)]
    pub name: Option<String>,
}
