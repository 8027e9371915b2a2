//! Integration tests for the HTTP surface, driven through the router
//! with `tower::ServiceExt::oneshot` (no sockets, no network).

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use teloxide::prelude::*;
use tower::ServiceExt;

use botshop::core::config::{GatewayConfig, StorageKind};
use botshop::core::rate_limiter::RateLimiter;
use botshop::storage::{MemStore, PaymentLedger};
use botshop::telegram::{schema, HandlerDeps};
use botshop::web_server::{build_router, WebState};

fn test_config() -> GatewayConfig {
    GatewayConfig {
        bot_token: "123:test-token".into(),
        webhook_url: "https://example.test/webhook".into(),
        webhook_secret: None,
        admin_token: None,
        site_url: "https://site.test".into(),
        invite_link: Some("https://t.me/+invite".into()),
        join_price_nis: 39,
        version_tag: "test-tag".into(),
        web_port: 0,
        bot_api_url: None,
        storage: StorageKind::Ephemeral,
    }
}

/// Bot pointed at an unroutable address so any accidental send fails fast
/// instead of hitting the real API.
fn offline_bot() -> Bot {
    let bot = Bot::new("123:test-token");
    bot.set_api_url("http://127.0.0.1:9/".parse().expect("valid url"))
}

fn make_state(config: GatewayConfig) -> (WebState, MemStore) {
    let store = MemStore::new();
    let ledger = Arc::new(PaymentLedger::ephemeral(store.clone()));
    let config = Arc::new(config);
    let deps = HandlerDeps {
        ledger: ledger.clone(),
        config: config.clone(),
        rate_limiter: Arc::new(RateLimiter::new()),
    };
    let state = WebState {
        config,
        ledger,
        bot: offline_bot(),
        schema: Arc::new(schema(deps)),
    };
    (state, store)
}

async fn get_json(state: WebState, uri: &str) -> (StatusCode, Value) {
    let app = build_router(state);
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_ok() {
    let (state, _store) = make_state(test_config());
    let (status, body) = get_json(state, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn version_reports_configured_tag() {
    let (state, _store) = make_state(test_config());
    let (status, body) = get_json(state, "/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"version": "test-tag"}));
}

#[tokio::test]
async fn meta_names_the_service() {
    let (state, _store) = make_state(test_config());
    let (status, body) = get_json(state, "/meta").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "botshop");
    assert_eq!(body["version"], "test-tag");
    assert_eq!(body["site_url"], "https://site.test");
    assert_eq!(body["has_invite"], true);
}

#[tokio::test]
async fn config_exposes_no_secrets() {
    let mut config = test_config();
    config.admin_token = Some("hush".into());
    config.webhook_secret = Some("shh".into());
    let (state, _store) = make_state(config);

    let (status, body) = get_json(state, "/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({
        "site_url": "https://site.test",
        "invite_set": true,
        "price_nis": 39,
    }));

    let rendered = body.to_string();
    assert!(!rendered.contains("hush"));
    assert!(!rendered.contains("shh"));
    assert!(!rendered.contains("test-token"));
}

#[tokio::test]
async fn admin_stats_requires_the_token() {
    let mut config = test_config();
    config.admin_token = Some("s3cret".into());
    let (state, _store) = make_state(config);
    let app = build_router(state);

    let no_token = app
        .clone()
        .oneshot(Request::get("/admin/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(no_token.status(), StatusCode::UNAUTHORIZED);

    let wrong = app
        .clone()
        .oneshot(
            Request::get("/admin/stats")
                .header("authorization", "Bearer nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let bearer = app
        .clone()
        .oneshot(
            Request::get("/admin/stats")
                .header("authorization", "Bearer s3cret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(bearer.status(), StatusCode::OK);

    let query = app
        .oneshot(
            Request::get("/admin/stats?token=s3cret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(query.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_stats_denied_when_no_token_configured() {
    let (state, _store) = make_state(test_config());
    let app = build_router(state);
    let response = app
        .oneshot(
            Request::get("/admin/stats")
                .header("authorization", "Bearer anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_stats_counts_ledger_rows() {
    let mut config = test_config();
    config.admin_token = Some("s3cret".into());
    let (state, store) = make_state(config);
    store.record_pending(1, Some("@a"), "image");
    store.record_pending(2, None, "document");

    let (status, body) = get_json(state, "/admin/stats?token=s3cret").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], "test-tag");
    assert_eq!(body["site_url"], "https://site.test");
    assert_eq!(
        body["stats"],
        json!({"pending": 2, "approved": 0, "rejected": 0, "total": 2})
    );
}

fn photo_update(user_id: i64) -> Value {
    json!({
        "update_id": 900001,
        "message": {
            "message_id": 10,
            "date": 1700000000,
            "chat": {"id": user_id, "type": "private", "first_name": "Payer"},
            "from": {"id": user_id, "is_bot": false, "first_name": "Payer", "username": "payer"},
            "photo": [{
                "file_id": "f1", "file_unique_id": "u1",
                "width": 640, "height": 480, "file_size": 12345
            }]
        }
    })
}

async fn post_webhook(
    app: axum::Router,
    body: String,
    secret: Option<&str>,
) -> axum::http::Response<Body> {
    let mut request = Request::post("/webhook").header("content-type", "application/json");
    if let Some(secret) = secret {
        request = request.header("x-telegram-bot-api-secret-token", secret);
    }
    app.oneshot(request.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

#[tokio::test]
async fn webhook_rejects_wrong_secret_without_side_effects() {
    let mut config = test_config();
    config.webhook_secret = Some("hook-secret".into());
    let (state, store) = make_state(config);
    let app = build_router(state);

    let missing = post_webhook(app.clone(), photo_update(42).to_string(), None).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = post_webhook(app, photo_update(42).to_string(), Some("other")).await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    assert!(store.records().is_empty());
}

#[tokio::test]
async fn webhook_accepts_matching_secret() {
    let mut config = test_config();
    config.webhook_secret = Some("hook-secret".into());
    let (state, store) = make_state(config);
    let app = build_router(state);

    let response = post_webhook(app, photo_update(42).to_string(), Some("hook-secret")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.records().len(), 1);
}

#[tokio::test]
async fn webhook_without_configured_secret_ignores_the_header() {
    let (state, store) = make_state(test_config());
    let app = build_router(state);

    let response = post_webhook(app, photo_update(42).to_string(), Some("bogus")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user_id, 42);
}

#[tokio::test]
async fn webhook_rejects_malformed_body() {
    let (state, _store) = make_state(test_config());
    let app = build_router(state);
    let response = post_webhook(app, "{not json".to_string(), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhook_records_proof_and_acks() {
    let (state, store) = make_state(test_config());
    let app = build_router(state);

    let response = post_webhook(app, photo_update(42).to_string(), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"ok": true}));

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user_id, 42);
    assert_eq!(records[0].method, "image");
    assert_eq!(records[0].status, "pending");
}

#[tokio::test]
async fn webhook_acks_updates_no_handler_wants() {
    let (state, store) = make_state(test_config());
    let app = build_router(state);

    // Valid update shape, but an edited message that no branch handles.
    let update = json!({
        "update_id": 900002,
        "edited_message": {
            "message_id": 11,
            "date": 1700000000,
            "edit_date": 1700000100,
            "chat": {"id": 42, "type": "private", "first_name": "Payer"},
            "from": {"id": 42, "is_bot": false, "first_name": "Payer"},
            "text": "edited"
        }
    });
    let response = post_webhook(app, update.to_string(), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(store.records().is_empty());
}
