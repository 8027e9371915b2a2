//! HTTP surface of the gateway: operational endpoints, the admin stats
//! API and the Telegram webhook ingress.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::ops::ControlFlow;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::Update;
use tokio::net::TcpListener;

use crate::core::config::GatewayConfig;
use crate::storage::PaymentLedger;
use crate::telegram::HandlerError;

const TELEGRAM_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Shared state for every route.
#[derive(Clone)]
pub struct WebState {
    pub config: Arc<GatewayConfig>,
    pub ledger: Arc<PaymentLedger>,
    pub bot: Bot,
    pub schema: Arc<UpdateHandler<HandlerError>>,
}

/// Builds the router. Split from [`start_web_server`] so tests can drive
/// it with `tower::ServiceExt::oneshot`.
pub fn build_router(state: WebState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/meta", get(meta_handler))
        .route("/config", get(config_handler))
        .route("/admin/stats", get(admin_stats_handler))
        .route("/webhook", post(webhook_handler))
        .with_state(state)
}

/// Binds WEB_PORT on all interfaces and serves until shutdown.
pub async fn start_web_server(state: WebState) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.web_port));
    let app = build_router(state);

    log::info!("Starting web server on http://{}", addr);
    log::info!("  GET  /health       - Liveness probe");
    log::info!("  GET  /version      - Deployed version tag");
    log::info!("  GET  /meta         - Service metadata");
    log::info!("  GET  /config       - Non-secret runtime config");
    log::info!("  GET  /admin/stats  - Payment counters (token-gated)");
    log::info!("  POST /webhook      - Telegram update ingress");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install shutdown handler: {}", e);
    }
    log::info!("Shutdown signal received, draining web server");
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({"ok": true}))
}

async fn version_handler(State(state): State<WebState>) -> Json<serde_json::Value> {
    Json(json!({"version": state.config.version_tag}))
}

async fn meta_handler(State(state): State<WebState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "botshop",
        "version": state.config.version_tag,
        "site_url": state.config.site_url,
        "has_invite": state.config.has_invite(),
    }))
}

/// Non-secret configuration snapshot. Booleans only for anything sensitive.
async fn config_handler(State(state): State<WebState>) -> Json<serde_json::Value> {
    let config = &state.config;
    Json(json!({
        "site_url": config.site_url,
        "invite_set": config.has_invite(),
        "price_nis": config.join_price_nis,
    }))
}

/// True when the request carries the admin token, either as a
/// `Bearer` header or a `?token=` query parameter. Always false when no
/// token is configured.
pub fn is_admin_request(
    config: &GatewayConfig,
    headers: &HeaderMap,
    query: &HashMap<String, String>,
) -> bool {
    let Some(expected) = config.admin_token.as_deref() else {
        return false;
    };

    let header_ok = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .is_some_and(|token| token == expected);

    header_ok || query.get("token").is_some_and(|t| t == expected)
}

async fn admin_stats_handler(
    State(state): State<WebState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !is_admin_request(&state.config, &headers, &query) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"}))).into_response();
    }

    match state.ledger.aggregate_counts() {
        Ok(counts) => Json(json!({
            "version": state.config.version_tag,
            "site_url": state.config.site_url,
            "stats": counts,
        }))
        .into_response(),
        Err(e) => {
            log::error!("Failed to aggregate payment counts: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "storage error"})))
                .into_response()
        }
    }
}

/// Telegram update ingress.
///
/// Rejects requests that fail the secret-token check (401) or carry a body
/// that is not an Update (400). Everything else is acked with 200 after
/// dispatch, including updates no handler matched; Telegram retries
/// non-2xx responses forever and a retry cannot fix an unhandled update.
async fn webhook_handler(
    State(state): State<WebState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if let Some(expected) = state.config.webhook_secret.as_deref() {
        let presented = headers
            .get(TELEGRAM_SECRET_HEADER)
            .and_then(|v| v.to_str().ok());
        if presented != Some(expected) {
            log::warn!("Webhook request rejected: bad or missing secret token");
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad secret"})))
                .into_response();
        }
    }

    let update: Update = match serde_json::from_str(&body) {
        Ok(update) => update,
        Err(e) => {
            log::warn!("Webhook request rejected: malformed update: {}", e);
            return (StatusCode::BAD_REQUEST, Json(json!({"error": "malformed update"})))
                .into_response();
        }
    };

    let update_id = update.id;
    let bot = state.bot.clone();
    match state.schema.dispatch(dptree::deps![bot, update]).await {
        ControlFlow::Break(Ok(())) => {}
        ControlFlow::Break(Err(e)) => {
            log::error!("Handler failed for update {}: {}", update_id.0, e);
        }
        ControlFlow::Continue(_) => {
            log::debug!("No handler matched update {}", update_id.0);
        }
    }

    Json(json!({"ok": true})).into_response()
}
