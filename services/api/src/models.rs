//! API models for request and response payloads

use common::UserSummary;
use serde::{Deserialize, Serialize};

/// Request for user login
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response for user login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Request for posting a comment
#[derive(Debug, Clone, Serialize)]
pub struct CommentRequest {
    pub text: String,
}

/// Response for the authoritative comment count
#[derive(Debug, Clone, Deserialize)]
pub struct CommentCountResponse {
    pub count: u64,
}

/// Request for reporting a post
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub post_id: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Request for a support ticket
#[derive(Debug, Clone, Serialize)]
pub struct ContactRequest {
    pub subject: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Response for a support ticket
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub complaint_id: String,
}

/// Generic acknowledgement body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Entry of the chat directory
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatUser {
    #[serde(alias = "_id")]
    pub id: String,
    pub username: String,
    #[serde(rename = "profileImageURL", default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub unread_count: u32,
}

/// Error body returned by the server
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}
