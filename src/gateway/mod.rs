//! HTTP entry point: Telegram webhook delivery plus health and info routes.

use std::sync::Arc;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{debug, error, info, warn};

use crate::channels::telegram;
use crate::dispatch::Dispatcher;

/// Max webhook payload size: 1 MB.
const WEBHOOK_MAX_BODY: usize = 1_048_576;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct GatewayState {
    dispatcher: Arc<Dispatcher>,
}

impl GatewayState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

pub(crate) fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/webhook", post(webhook_handler))
        .with_state(state)
}

fn status(ok: bool) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": if ok { "ok" } else { "error" } }))
}

/// POST /webhook: one Telegram update per request.
///
/// Always answers 200 so Telegram does not redeliver; failures are reported
/// in the body as `{"status": "error"}`.
async fn webhook_handler(State(state): State<GatewayState>, body: Bytes) -> impl IntoResponse {
    if body.len() > WEBHOOK_MAX_BODY {
        warn!("webhook: payload too large ({} bytes)", body.len());
        return status(false);
    }

    let update = match telegram::parse_update(&body) {
        Ok(Some(update)) => update,
        Ok(None) => return status(true),
        Err(e) => {
            error!("webhook: failed to decode update: {:#}", e);
            return status(false);
        }
    };

    debug!(
        "webhook: update from user {} in chat {}",
        update.user_id, update.chat_id
    );
    match state.dispatcher.dispatch(update).await {
        Ok(()) => status(true),
        Err(e) => {
            error!("webhook: handling update failed: {:#}", e);
            status(false)
        }
    }
}

/// GET /health: liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "running" }))
}

/// GET /: service description.
async fn index_handler(State(state): State<GatewayState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": crate::VERSION,
        "model": state.dispatcher.model(),
        "endpoints": ["POST /webhook", "GET /health", "GET /"],
    }))
}

/// Bind the listener and serve in a background task.
pub async fn start(
    host: &str,
    port: u16,
    state: GatewayState,
) -> Result<(tokio::task::JoinHandle<()>, std::net::SocketAddr)> {
    let app = build_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local = listener.local_addr()?;
    info!("HTTP gateway listening on {}", local);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP gateway error: {}", e);
        }
    });

    Ok((handle, local))
}

#[cfg(test)]
mod tests;
