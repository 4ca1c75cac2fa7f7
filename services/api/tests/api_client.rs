//! API client integration tests using wiremock
//!
//! Verifies that the client:
//!
//! - persists the login response into the session and presents it as a
//!   bearer credential afterwards;
//! - refuses invalid input without touching the network;
//! - ends the session when the server answers `401`;
//! - drives the optimistic feed end to end, including rollback.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use api::{ApiClient, ApiError, ContactRequest, ReportRequest};
use common::{MemoryStore, NoticeLevel, SlotStore, notice};
use feed::{Confirmation, FeedController};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;
use session::{SessionStore, SlotKeys};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn token_expiring_at(exp: u64) -> String {
    encode(
        &Header::default(),
        &json!({ "id": "u1", "exp": exp }),
        &EncodingKey::from_secret(b"only-the-server-knows"),
    )
    .unwrap()
}

fn user_body() -> serde_json::Value {
    json!({
        "_id": "u1",
        "username": "ada",
        "profileImageURL": "https://cdn.example.com/ada.png",
        "isVerified": false,
        "name": "Ada"
    })
}

fn feed_body() -> serde_json::Value {
    json!({
        "unviewed": [{
            "_id": "p1",
            "author": {"_id": "u2", "username": "bob"},
            "media": [{"type": "image", "url": "https://cdn.example.com/p1.jpg"}],
            "caption": "hello",
            "likes": [{"_id": "u3", "username": "cy"}],
            "commentCount": 2,
            "createdAt": "2024-05-01T10:00:00Z"
        }],
        "viewed": []
    })
}

struct Setup {
    server: MockServer,
    storage: Arc<MemoryStore>,
    api: ApiClient,
}

async fn setup() -> Setup {
    let server = MockServer::start().await;
    let storage = Arc::new(MemoryStore::new());
    let session = Arc::new(SessionStore::new(storage.clone(), SlotKeys::default()));
    let api = ApiClient::with_client(reqwest::Client::new(), &server.uri(), session).unwrap();
    Setup {
        server,
        storage,
        api,
    }
}

/// A setup with a valid credential already persisted
async fn logged_in() -> (Setup, String) {
    let setup = setup().await;
    let token = token_expiring_at(now() + 3600);
    setup.storage.set("token", &token).unwrap();
    setup.api.session().initialize();
    (setup, token)
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_login_persists_session_and_sends_bearer() {
    let s = setup().await;
    let token = token_expiring_at(now() + 3600);

    Mock::given(method("POST"))
        .and(path("/user/login"))
        .and(body_json(json!({"username": "ada", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"token": token, "user": user_body()})),
        )
        .expect(1)
        .mount(&s.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/post/feed"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_body()))
        .expect(1)
        .mount(&s.server)
        .await;

    let login = s.api.login(" ada ", "secret").await.unwrap();
    assert_eq!(login.user.username, "ada");

    let session = s.api.session().session();
    assert!(session.is_logged_in);
    assert_eq!(session.user.unwrap().id, "u1");
    assert_eq!(s.storage.get("token").unwrap(), Some(token));

    let lists = s.api.feed().await.unwrap();
    assert_eq!(lists.unviewed[0].id, "p1");
}

#[tokio::test]
async fn test_login_validation_skips_network() {
    let s = setup().await;

    Mock::given(method("POST"))
        .and(path("/user/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&s.server)
        .await;

    let result = s.api.login("", "secret").await;
    assert!(matches!(result, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn test_login_with_wrong_password_reports_status() {
    let s = setup().await;

    Mock::given(method("POST"))
        .and(path("/user/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&s.server)
        .await;

    match s.api.login("ada", "wrong").await {
        Err(ApiError::Status { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!s.api.session().session().is_logged_in);
}

#[tokio::test]
async fn test_unauthorized_response_ends_session() {
    let (s, _token) = logged_in().await;
    assert!(s.api.session().session().is_logged_in);

    Mock::given(method("GET"))
        .and(path("/post/feed"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&s.server)
        .await;

    let result = s.api.feed().await;

    assert!(matches!(result, Err(ApiError::InvalidCredential)));
    assert!(!s.api.session().session().is_logged_in);
    assert_eq!(s.storage.get("token").unwrap(), None);
}

#[tokio::test]
async fn test_expired_credential_never_reaches_network() {
    let s = setup().await;
    s.storage
        .set("token", &token_expiring_at(now() - 10))
        .unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&s.server)
        .await;

    assert!(matches!(s.api.feed().await, Err(ApiError::InvalidCredential)));
    assert_eq!(s.storage.get("token").unwrap(), None);
}

#[tokio::test]
async fn test_refresh_profile_updates_cached_user() {
    let (s, _token) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/user/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .mount(&s.server)
        .await;

    let user = s.api.refresh_profile().await.unwrap();
    assert_eq!(s.api.session().session().user, Some(user));
    assert!(s.storage.get("user").unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_server_error_message_is_surfaced() {
    let (s, _token) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/post/p1/likes"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
        .mount(&s.server)
        .await;

    match s.api.likers("p1").await {
        Err(ApiError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_comments_and_count() {
    let (s, _token) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/post/p1/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "_id": "c1",
            "user": {"_id": "u2", "username": "bob"},
            "text": "first",
            "createdAt": "2024-05-01T10:05:00Z"
        }])))
        .mount(&s.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/post/p1/comments/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 1})))
        .mount(&s.server)
        .await;

    let comments = s.api.comments("p1").await.unwrap();
    assert_eq!(comments[0].text, "first");
    assert_eq!(s.api.comment_count("p1").await.unwrap(), 1);
}

#[tokio::test]
async fn test_report_acknowledgement_bodies() {
    let (s, _token) = logged_in().await;
    let report = ReportRequest {
        post_id: "p1".to_string(),
        reason: "spam".to_string(),
        details: Some("bot account".to_string()),
    };

    Mock::given(method("POST"))
        .and(path("/post/report-post"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Report received"})),
        )
        .up_to_n_times(1)
        .mount(&s.server)
        .await;
    let ack = s.api.report_post(&report).await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("Report received"));

    // A body that is not JSON still counts as accepted
    Mock::given(method("POST"))
        .and(path("/post/report-post"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&s.server)
        .await;
    let ack = s.api.report_post(&report).await.unwrap();
    assert_eq!(ack.message, None);
}

#[tokio::test]
async fn test_report_and_contact() {
    let (s, _token) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/post/report-post"))
        .and(body_json(json!({"postId": "p1", "reason": "spam"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&s.server)
        .await;

    Mock::given(method("POST"))
        .and(path("/user/contact"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"complaintId": "T-42"})))
        .expect(1)
        .mount(&s.server)
        .await;

    s.api
        .report_post(&ReportRequest {
            post_id: "p1".to_string(),
            reason: "spam".to_string(),
            details: None,
        })
        .await
        .unwrap();

    let ticket = s
        .api
        .contact(&ContactRequest {
            subject: "Locked out".to_string(),
            message: "Please help".to_string(),
            email: Some("ada@example.com".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(ticket.complaint_id, "T-42");

    let refused = s
        .api
        .contact(&ContactRequest {
            subject: String::new(),
            message: "Please help".to_string(),
            email: None,
        })
        .await;
    assert!(matches!(refused, Err(ApiError::Validation(_))));
}

#[tokio::test]
async fn test_chat_directory_and_search() {
    let (s, _token) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/messages/chat-users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "_id": "u2",
            "username": "bob",
            "lastMessage": "see you",
            "unreadCount": 2
        }])))
        .mount(&s.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/messages/search-usernames"))
        .and(query_param("query", "bo"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"_id": "u2", "username": "bob"}])),
        )
        .expect(1)
        .mount(&s.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/suggestions/u1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"_id": "u4", "username": "dee"}])),
        )
        .mount(&s.server)
        .await;

    let chats = s.api.chat_users().await.unwrap();
    assert_eq!(chats[0].username, "bob");
    assert_eq!(chats[0].unread_count, 2);

    assert!(s.api.search_usernames("  ").await.unwrap().is_empty());
    assert_eq!(s.api.search_usernames("bo").await.unwrap()[0].id, "u2");
    assert_eq!(s.api.suggestions("u1").await.unwrap()[0].username, "dee");
}

// ---------------------------------------------------------------------------
// Optimistic feed over the real client
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_feed_like_rejected_by_server_rolls_back() {
    let (s, _token) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/post/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_body()))
        .mount(&s.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/post/p1/like"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&s.server)
        .await;

    let (sender, mut notices) = notice::channel();
    let controller = FeedController::new(s.api.clone(), "u1", sender);
    controller.load(s.api.feed().await.unwrap());

    let pending = controller.toggle_like("p1").unwrap();
    assert!(controller.items()[0].liked_by_user);

    assert_eq!(pending.outcome().await, Confirmation::RolledBack);
    let item = &controller.items()[0];
    assert!(!item.liked_by_user);
    assert_eq!(item.likes.len(), 1);
    assert_eq!(notices.try_recv().unwrap().level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_feed_comment_refreshes_count_from_server() {
    let (s, _token) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/post/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_body()))
        .mount(&s.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/post/p1/comment"))
        .and(body_json(json!({"text": "great"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_id": "c9",
            "user": user_body(),
            "text": "great"
        })))
        .expect(1)
        .mount(&s.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/post/p1/comments/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 3})))
        .expect(1)
        .mount(&s.server)
        .await;

    let (sender, _notices) = notice::channel();
    let controller = FeedController::new(s.api.clone(), "u1", sender);
    controller.load(s.api.feed().await.unwrap());

    let comment = controller.post_comment("p1", "great").await.unwrap();
    assert_eq!(comment.id, "c9");
    assert_eq!(controller.items()[0].comment_count, 3);
}
