//! End-to-end tests driving the router with the in-memory platform services.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use homeboy_admin_api::{build_router, AppState};
use homeboy_config::AppConfig;
use homeboy_platform::{
    DocumentStore, IdentityProvider, MemoryDocumentStore, MemoryIdentityProvider,
    MemoryPushGateway,
};

const ADMIN_EMAIL: &str = "admin@homeboy.app";
const ADMIN_PASSWORD: &str = "hunter2!";

struct TestApp {
    router: Router,
    store: Arc<MemoryDocumentStore>,
    identity: Arc<MemoryIdentityProvider>,
    push: Arc<MemoryPushGateway>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let identity = Arc::new(MemoryIdentityProvider::new());
        let push = Arc::new(MemoryPushGateway::new());

        let state = AppState::new(store.clone(), identity.clone(), push.clone(), &config);
        Self {
            router: build_router(state),
            store,
            identity,
            push,
        }
    }

    /// Config with the stats debounce disabled so every read recomputes.
    fn instant_stats_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.dashboard.refresh_debounce_ms = 0;
        config
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    /// Register the configured admin, sign in, and return the session cookie
    /// pair for subsequent requests.
    async fn login_admin(&self) -> String {
        let (status, _) = self
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": ADMIN_EMAIL,
                    "password": ADMIN_PASSWORD,
                    "display_name": "Admin"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"email": ADMIN_EMAIL, "password": ADMIN_PASSWORD}).to_string(),
            ))
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .expect("login should set a session cookie")
            .to_string();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn seed_profile(&self, uid: &str, email: &str, push_token: Option<&str>) {
        self.store
            .create(
                "users",
                Some(uid),
                json!({
                    "email": email,
                    "display_name": "Seller",
                    "is_admin": false,
                    "push_token": push_token,
                    "created_at": "2026-08-01T00:00:00Z",
                    "updated_at": "2026-08-01T00:00:00Z",
                }),
            )
            .await
            .unwrap();
    }

    async fn seed_listing(&self, id: &str, owner_uid: &str, status: &str) {
        self.store
            .create(
                "listings",
                Some(id),
                json!({
                    "title": "Brick bungalow",
                    "description": "Three beds near the park",
                    "price": 325_000.0,
                    "location": "Durham",
                    "beds": 3,
                    "baths": 2,
                    "image_urls": [],
                    "status": status,
                    "owner_uid": owner_uid,
                    "created_at": "2026-08-10T00:00:00Z",
                    "updated_at": "2026-08-10T00:00:00Z",
                }),
            )
            .await
            .unwrap();
    }

    async fn seed_inquiry(&self, id: &str, email: &str, status: &str) {
        self.store
            .create(
                "inquiries",
                Some(id),
                json!({
                    "name": "Curious Buyer",
                    "email": email,
                    "phone": null,
                    "message": "Is this still available?",
                    "listing_id": "l1",
                    "status": status,
                    "created_at": "2026-08-12T00:00:00Z",
                    "updated_at": "2026-08-12T00:00:00Z",
                }),
            )
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.request("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_requires_session() {
    let app = TestApp::new();

    for path in ["/api/listings", "/api/inquiries", "/api/stats", "/api/auth/me"] {
        let (status, _) = app.request("GET", path, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path} should be gated");
    }

    let (status, _) = app
        .request("GET", "/api/listings", Some("homeboy_session=forged"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn sessions_of_other_directory_accounts_are_forbidden() {
    let app = TestApp::new();

    // The mobile app's users share the identity directory; mint a session
    // for one of them without going through the dashboard login.
    app.identity
        .sign_up("seller@example.com", "secret99", None)
        .await
        .unwrap();
    let signed_in = app
        .identity
        .sign_in("seller@example.com", "secret99")
        .await
        .unwrap();
    let session = app
        .identity
        .create_session_cookie(&signed_in.id_token, Duration::from_secs(60))
        .await
        .unwrap();
    let cookie = format!("homeboy_session={session}");

    for path in ["/api/listings", "/api/inquiries", "/api/stats"] {
        let (status, _) = app.request("GET", path, Some(&cookie), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{path} should refuse the session");
    }

    let (status, _) = app
        .request(
            "PATCH",
            "/api/listings/l1/status",
            Some(&cookie),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_flow_establishes_admin_session() {
    let app = TestApp::new();
    let cookie = app.login_admin().await;

    let (status, body) = app.request("GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], ADMIN_EMAIL);
    assert_eq!(body["is_admin"], true);
}

#[tokio::test]
async fn non_admin_email_is_forbidden() {
    let app = TestApp::new();
    let (status, _) = app
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"email": "buyer@example.com", "password": "secret99"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "buyer@example.com", "password": "secret99"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("not authorized"));
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new();
    let _ = app.login_admin().await;

    let (status, _) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": ADMIN_EMAIL, "password": "nope"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let app = TestApp::new();
    let cookie = app.login_admin().await;

    let (status, _) = app
        .request("POST", "/api/auth/logout", Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.request("GET", "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn listing_creation_validates_input() {
    let app = TestApp::new();
    let cookie = app.login_admin().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/listings",
            Some(&cookie),
            Some(json!({
                "title": "  ",
                "description": "d",
                "price": 100.0,
                "location": "x",
                "beds": 1,
                "baths": 1,
                "owner_uid": "u1"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("title"));
    assert_eq!(app.store.document_count("listings").await, 0);

    let (status, _) = app
        .request(
            "POST",
            "/api/listings",
            Some(&cookie),
            Some(json!({
                "title": "t",
                "description": "d",
                "price": -5.0,
                "location": "x",
                "beds": 1,
                "baths": 1,
                "owner_uid": "u1"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.document_count("listings").await, 0);
}

#[tokio::test]
async fn invalid_status_filter_is_rejected() {
    let app = TestApp::new();
    let cookie = app.login_admin().await;

    let (status, _) = app
        .request("GET", "/api/listings?status=archived", Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn approving_a_listing_notifies_the_owner() {
    let app = TestApp::new();
    let cookie = app.login_admin().await;
    app.seed_profile("seller-1", "seller@example.com", Some("device-abc"))
        .await;
    app.seed_listing("l1", "seller-1", "pending").await;

    let (status, body) = app
        .request(
            "PATCH",
            "/api/listings/l1/status",
            Some(&cookie),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["listing"]["status"], "approved");
    assert_eq!(body["changed"], true);
    assert_eq!(body["push_delivered"], true);
    assert_eq!(body["notification_recorded"], true);

    let sent = app.push.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].token, "device-abc");
    assert_eq!(app.store.document_count("notifications").await, 1);
}

#[tokio::test]
async fn review_decisions_are_final() {
    let app = TestApp::new();
    let cookie = app.login_admin().await;
    app.seed_profile("seller-1", "seller@example.com", Some("device-abc"))
        .await;
    app.seed_listing("l1", "seller-1", "pending").await;

    let (status, _) = app
        .request(
            "PATCH",
            "/api/listings/l1/status",
            Some(&cookie),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Flipping an approved listing to rejected is refused.
    let (status, _) = app
        .request(
            "PATCH",
            "/api/listings/l1/status",
            Some(&cookie),
            Some(json!({"status": "rejected"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Re-sending the standing decision is a no-op, not an error, and does
    // not notify again.
    let (status, body) = app
        .request(
            "PATCH",
            "/api/listings/l1/status",
            Some(&cookie),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], false);
    assert_eq!(body["push_delivered"], false);
    assert_eq!(app.push.sent().await.len(), 1);
}

#[tokio::test]
async fn unknown_status_value_leaves_the_record_untouched() {
    let app = TestApp::new();
    let cookie = app.login_admin().await;
    app.seed_listing("l1", "seller-1", "pending").await;

    let (status, _) = app
        .request(
            "PATCH",
            "/api/listings/l1/status",
            Some(&cookie),
            Some(json!({"status": "archived"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request("GET", "/api/listings/l1", Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
async fn approval_succeeds_for_owners_without_push_tokens() {
    let app = TestApp::new();
    let cookie = app.login_admin().await;
    app.seed_profile("seller-1", "seller@example.com", None).await;
    app.seed_listing("l1", "seller-1", "pending").await;

    let (status, body) = app
        .request(
            "PATCH",
            "/api/listings/l1/status",
            Some(&cookie),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["push_delivered"], false);
    assert_eq!(body["notification_recorded"], true);
    assert!(app.push.sent().await.is_empty());
}

#[tokio::test]
async fn push_outage_does_not_block_review() {
    let app = TestApp::new();
    let cookie = app.login_admin().await;
    app.seed_profile("seller-1", "seller@example.com", Some("device-abc"))
        .await;
    app.seed_listing("l1", "seller-1", "pending").await;
    app.push.set_failing(true).await;

    let (status, body) = app
        .request(
            "PATCH",
            "/api/listings/l1/status",
            Some(&cookie),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["listing"]["status"], "approved");
    assert_eq!(body["push_delivered"], false);
    assert_eq!(body["notification_recorded"], true);
}

#[tokio::test]
async fn notification_write_failure_is_reported_not_fatal() {
    let app = TestApp::new();
    let cookie = app.login_admin().await;
    app.seed_profile("seller-1", "seller@example.com", Some("device-abc"))
        .await;
    app.seed_listing("l1", "seller-1", "pending").await;
    app.store.fail_writes_to("notifications").await;

    let (status, body) = app
        .request(
            "PATCH",
            "/api/listings/l1/status",
            Some(&cookie),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["listing"]["status"], "approved");
    assert_eq!(body["push_delivered"], true);
    assert_eq!(body["notification_recorded"], false);
}

#[tokio::test]
async fn inquiry_review_resolves_the_sender_by_email() {
    let app = TestApp::new();
    let cookie = app.login_admin().await;
    app.seed_profile("buyer-1", "buyer@example.com", Some("device-xyz"))
        .await;
    app.seed_inquiry("q1", "buyer@example.com", "pending").await;
    app.seed_inquiry("q2", "stranger@example.com", "pending").await;

    let (status, body) = app
        .request(
            "PATCH",
            "/api/inquiries/q1/status",
            Some(&cookie),
            Some(json!({"status": "approved"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], true);
    assert_eq!(body["push_delivered"], true);

    // No profile for the sender: the decision still lands, the fan-out is
    // skipped.
    let (status, body) = app
        .request(
            "PATCH",
            "/api/inquiries/q2/status",
            Some(&cookie),
            Some(json!({"status": "rejected"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inquiry"]["status"], "rejected");
    assert_eq!(body["push_delivered"], false);
    assert_eq!(body["notification_recorded"], false);
}

#[tokio::test]
async fn notification_feed_roundtrip() {
    let app = TestApp::new();
    let cookie = app.login_admin().await;

    let (_, me) = app.request("GET", "/api/auth/me", Some(&cookie), None).await;
    let admin_uid = me["uid"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            "POST",
            "/api/notifications",
            Some(&cookie),
            Some(json!({
                "user_uid": admin_uid,
                "title": "Weekly digest",
                "body": "3 listings awaiting review",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notification_recorded"], true);

    let (status, feed) = app
        .request("GET", "/api/notifications", Some(&cookie), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let feed = feed.as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["title"], "Weekly digest");
    let id = feed[0]["id"].as_str().unwrap().to_string();

    let (_, count) = app
        .request("GET", "/api/notifications/unseen-count", Some(&cookie), None)
        .await;
    assert_eq!(count["unseen_count"], 1);

    let (status, _) = app
        .request(
            "PATCH",
            &format!("/api/notifications/{id}/seen"),
            Some(&cookie),
            Some(json!({"seen": true})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, count) = app
        .request("GET", "/api/notifications/unseen-count", Some(&cookie), None)
        .await;
    assert_eq!(count["unseen_count"], 0);
}

#[tokio::test]
async fn sending_to_unknown_user_is_not_found() {
    let app = TestApp::new();
    let cookie = app.login_admin().await;

    let (status, _) = app
        .request(
            "POST",
            "/api/notifications",
            Some(&cookie),
            Some(json!({
                "user_uid": "ghost",
                "title": "Hello",
                "body": "Anyone there?",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_reflect_the_seeded_collections() {
    let app = TestApp::with_config(TestApp::instant_stats_config());
    let cookie = app.login_admin().await;

    app.seed_listing("l1", "seller-1", "pending").await;
    app.seed_listing("l2", "seller-1", "pending").await;
    app.seed_listing("l3", "seller-1", "approved").await;
    app.seed_inquiry("q1", "buyer@example.com", "pending").await;

    let (status, body) = app.request("GET", "/api/stats", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_listings"], 3);
    assert_eq!(body["pending_listings"], 2);
    assert_eq!(body["approved_listings"], 1);
    assert_eq!(body["rejected_listings"], 0);
    assert_eq!(body["total_inquiries"], 1);
    assert_eq!(body["pending_inquiries"], 1);
    // The admin profile created at login.
    assert_eq!(body["total_users"], 1);
    assert_eq!(body["listings_by_month"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn stats_serve_the_cached_snapshot_during_write_bursts() {
    // Default config: two-second debounce window.
    let app = TestApp::new();
    let cookie = app.login_admin().await;

    let (_, before) = app.request("GET", "/api/stats", Some(&cookie), None).await;
    assert_eq!(before["total_listings"], 0);

    let (status, _) = app
        .request(
            "POST",
            "/api/listings",
            Some(&cookie),
            Some(json!({
                "title": "New build",
                "description": "Fresh drywall",
                "price": 410_000.0,
                "location": "Raleigh",
                "beds": 4,
                "baths": 3,
                "owner_uid": "seller-1"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The write marked the cache dirty; within the window the stale
    // snapshot keeps being served instead of recomputing per request.
    let (_, during) = app.request("GET", "/api/stats", Some(&cookie), None).await;
    assert_eq!(during["total_listings"], 0);
}
