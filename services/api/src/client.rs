//! REST client for the snapfeed API
//!
//! Authenticated calls take the bearer credential from the session store at
//! the moment they are built. A `401` on an authenticated call means the
//! server no longer accepts the credential, so the session is torn down.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{ClientConfig, UserSummary};
use feed::{Comment, FeedBackend, FeedLists, FeedResult};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use session::SessionStore;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    error::{ApiError, ApiResult},
    models::{
        ChatUser, CommentCountResponse, CommentRequest, ContactRequest, ContactResponse,
        ErrorBody, LoginRequest, LoginResponse, MessageResponse, ReportRequest,
    },
    validation,
};

/// Typed client over the REST API
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a client from the client configuration
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Self::with_client(http, &config.api_base_url, session)
    }

    /// Create a client over an existing HTTP client
    pub fn with_client(http: Client, base_url: &str, session: Arc<SessionStore>) -> ApiResult<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, method: Method, segments: &[&str]) -> ApiResult<RequestBuilder> {
        let token = self.session.bearer().ok_or(ApiError::InvalidCredential)?;
        Ok(self
            .http
            .request(method, self.endpoint(segments)?)
            .bearer_auth(token))
    }

    async fn check(&self, response: Response, authenticated: bool) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if authenticated && status == StatusCode::UNAUTHORIZED {
            warn!("Server rejected the credential, ending session");
            self.session.expire();
            return Err(ApiError::InvalidCredential);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = self.check(request.send().await?, true).await?;
        Ok(response.json::<T>().await?)
    }

    async fn execute(&self, request: RequestBuilder) -> ApiResult<()> {
        self.check(request.send().await?, true).await?;
        Ok(())
    }

    /// Log in and persist the issued credential and user
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        validation::validate_login(username, password).map_err(ApiError::Validation)?;

        let request = self
            .http
            .post(self.endpoint(&["user", "login"])?)
            .json(&LoginRequest {
                username: username.trim().to_string(),
                password: password.to_string(),
            });
        let response = self.check(request.send().await?, false).await?;
        let login: LoginResponse = response.json().await?;

        self.session.login(&login.token, &login.user)?;
        info!("Logged in as {}", login.user.username);
        Ok(login)
    }

    /// Fetch the current user
    pub async fn profile(&self) -> ApiResult<UserSummary> {
        self.fetch(self.authorized(Method::GET, &["user", "profile"])?)
            .await
    }

    /// Fetch the current user and refresh the cached copy in the session
    pub async fn refresh_profile(&self) -> ApiResult<UserSummary> {
        let user = self.profile().await?;
        self.session.set_user(user.clone())?;
        Ok(user)
    }

    /// Fetch the feed
    pub async fn feed(&self) -> ApiResult<FeedLists> {
        let lists: FeedLists = self
            .fetch(self.authorized(Method::GET, &["post", "feed"])?)
            .await?;
        debug!("Fetched feed with {} posts", lists.len());
        Ok(lists)
    }

    pub async fn like(&self, post_id: &str) -> ApiResult<()> {
        self.execute(self.authorized(Method::POST, &["post", post_id, "like"])?)
            .await
    }

    pub async fn unlike(&self, post_id: &str) -> ApiResult<()> {
        self.execute(self.authorized(Method::POST, &["post", post_id, "unlike"])?)
            .await
    }

    /// Users who liked a post
    pub async fn likers(&self, post_id: &str) -> ApiResult<Vec<UserSummary>> {
        self.fetch(self.authorized(Method::GET, &["post", post_id, "likes"])?)
            .await
    }

    pub async fn comments(&self, post_id: &str) -> ApiResult<Vec<Comment>> {
        self.fetch(self.authorized(Method::GET, &["post", post_id, "comments"])?)
            .await
    }

    pub async fn add_comment(&self, post_id: &str, text: &str) -> ApiResult<Comment> {
        validation::validate_comment(text).map_err(ApiError::Validation)?;

        let request = self
            .authorized(Method::POST, &["post", post_id, "comment"])?
            .json(&CommentRequest {
                text: text.trim().to_string(),
            });
        self.fetch(request).await
    }

    /// Authoritative comment count of a post
    pub async fn comment_count(&self, post_id: &str) -> ApiResult<u64> {
        let body: CommentCountResponse = self
            .fetch(self.authorized(Method::GET, &["post", post_id, "comments", "count"])?)
            .await?;
        Ok(body.count)
    }

    pub async fn report_post(&self, report: &ReportRequest) -> ApiResult<MessageResponse> {
        validation::validate_report(report).map_err(ApiError::Validation)?;

        let request = self
            .authorized(Method::POST, &["post", "report-post"])?
            .json(report);
        let response = self.check(request.send().await?, true).await?;
        // Some deployments answer with an empty body
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(MessageResponse::default());
        }
        match serde_json::from_str(&body) {
            Ok(ack) => Ok(ack),
            Err(e) => {
                debug!("Unreadable report acknowledgement, using default: {}", e);
                Ok(MessageResponse::default())
            }
        }
    }

    /// Users suggested to `user_id`
    pub async fn suggestions(&self, user_id: &str) -> ApiResult<Vec<UserSummary>> {
        self.fetch(self.authorized(Method::GET, &["user", "suggestions", user_id])?)
            .await
    }

    /// Users the current user has chats with
    pub async fn chat_users(&self) -> ApiResult<Vec<ChatUser>> {
        self.fetch(self.authorized(Method::GET, &["messages", "chat-users"])?)
            .await
    }

    /// Search users by username prefix. A blank query matches nobody.
    pub async fn search_usernames(&self, query: &str) -> ApiResult<Vec<UserSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let request = self
            .authorized(Method::GET, &["messages", "search-usernames"])?
            .query(&[("query", query)]);
        self.fetch(request).await
    }

    /// Open a support ticket
    pub async fn contact(&self, request: &ContactRequest) -> ApiResult<ContactResponse> {
        validation::validate_contact(request).map_err(ApiError::Validation)?;

        let response: ContactResponse = self
            .fetch(self.authorized(Method::POST, &["user", "contact"])?.json(request))
            .await?;
        info!("Support ticket {} opened", response.complaint_id);
        Ok(response)
    }
}

#[async_trait]
impl FeedBackend for ApiClient {
    async fn like(&self, post_id: &str) -> FeedResult<()> {
        Ok(ApiClient::like(self, post_id).await?)
    }

    async fn unlike(&self, post_id: &str) -> FeedResult<()> {
        Ok(ApiClient::unlike(self, post_id).await?)
    }

    async fn comment_count(&self, post_id: &str) -> FeedResult<u64> {
        Ok(ApiClient::comment_count(self, post_id).await?)
    }

    async fn post_comment(&self, post_id: &str, text: &str) -> FeedResult<Comment> {
        Ok(self.add_comment(post_id, text).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::MemoryStore;
    use session::SlotKeys;

    fn client(base_url: &str) -> ApiResult<ApiClient> {
        let session = Arc::new(SessionStore::new(
            Arc::new(MemoryStore::new()),
            SlotKeys::default(),
        ));
        ApiClient::with_client(Client::new(), base_url, session)
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = client("http://localhost:5000/api").unwrap();
        assert_eq!(
            api.endpoint(&["post", "p1", "comments", "count"]).unwrap().as_str(),
            "http://localhost:5000/api/post/p1/comments/count"
        );

        let api = client("http://localhost:5000/").unwrap();
        assert_eq!(
            api.endpoint(&["user", "login"]).unwrap().as_str(),
            "http://localhost:5000/user/login"
        );
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let api = client("http://localhost:5000/api").unwrap();
        assert_eq!(
            api.endpoint(&["post", "a/b", "like"]).unwrap().as_str(),
            "http://localhost:5000/api/post/a%2Fb/like"
        );
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        assert!(matches!(
            client("mailto:someone@example.com"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
        assert!(matches!(client("not a url"), Err(ApiError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_authenticated_calls_need_credential() {
        let api = client("http://localhost:5000/api").unwrap();
        assert!(matches!(
            api.authorized(Method::GET, &["post", "feed"]),
            Err(ApiError::InvalidCredential)
        ));
    }
}
