use super::*;
use crate::channels::{ChatPlatform, InlineButton, SentMessage};
use crate::config::ChatConfig;
use crate::providers::base::{ChatRequest, LLMProvider, LLMResponse};
use crate::session::SessionManager;
use async_trait::async_trait;
use axum::http::{Request, StatusCode};
use std::sync::Mutex;
use tower::ServiceExt;

#[derive(Default)]
struct SinkPlatform {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl ChatPlatform for SinkPlatform {
    fn name(&self) -> &str {
        "sink"
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> anyhow::Result<SentMessage> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(SentMessage {
            chat_id: chat_id.to_string(),
            message_id: "1".into(),
        })
    }

    async fn send_with_buttons(
        &self,
        chat_id: &str,
        text: &str,
        _buttons: &[InlineButton],
    ) -> anyhow::Result<SentMessage> {
        self.send_text(chat_id, text).await
    }

    async fn edit_text(&self, _message: &SentMessage, _text: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn send_typing(&self, _chat_id: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn answer_callback(&self, _callback_id: &str) -> anyhow::Result<()> {
        anyhow::bail!("callback endpoint down")
    }
}

struct EchoProvider;

#[async_trait]
impl LLMProvider for EchoProvider {
    async fn chat(&self, req: ChatRequest) -> anyhow::Result<LLMResponse> {
        let last = req.messages.last().map(|m| m.content.clone());
        Ok(LLMResponse {
            content: last,
            total_tokens: None,
        })
    }

    fn default_model(&self) -> &str {
        "echo-1"
    }
}

fn make_state() -> (GatewayState, Arc<SinkPlatform>) {
    let platform = Arc::new(SinkPlatform::default());
    let chat = ChatConfig {
        settle_delay_ms: 0,
        reveal_delay_ms: 0,
        ..ChatConfig::default()
    };
    let dispatcher = Dispatcher::new(
        platform.clone(),
        Arc::new(EchoProvider),
        Arc::new(SessionManager::new()),
        chat,
    );
    (GatewayState::new(Arc::new(dispatcher)), platform)
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_webhook(body: impl Into<axum::body::Body>) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn text_update(text: &str) -> String {
    serde_json::json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "date": 1_700_000_000,
            "chat": {"id": 42, "type": "private", "first_name": "Ada"},
            "from": {"id": 42, "is_bot": false, "first_name": "Ada"},
            "text": text
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_health_endpoint_returns_running() {
    let (state, _) = make_state();
    let req = Request::builder()
        .uri("/health")
        .body(axum::body::Body::empty())
        .unwrap();

    let resp = build_router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "running");
}

#[tokio::test]
async fn test_index_describes_service() {
    let (state, _) = make_state();
    let req = Request::builder()
        .uri("/")
        .body(axum::body::Body::empty())
        .unwrap();

    let json = json_body(build_router(state).oneshot(req).await.unwrap()).await;
    assert_eq!(json["version"], crate::VERSION);
    assert_eq!(json["model"], "echo-1");
    assert!(json["endpoints"].as_array().unwrap().len() >= 3);
}

#[tokio::test]
async fn test_webhook_dispatches_text_update() {
    let (state, platform) = make_state();
    let resp = build_router(state)
        .oneshot(post_webhook(text_update("/help")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "ok");
    assert_eq!(
        platform.sent.lock().unwrap().as_slice(),
        [crate::locale::help(crate::locale::Language::Fr)]
    );
}

#[tokio::test]
async fn test_webhook_malformed_body_reports_error_with_200() {
    let (state, platform) = make_state();
    let resp = build_router(state)
        .oneshot(post_webhook("{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "error");
    assert!(platform.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_webhook_unsupported_update_is_ok() {
    let (state, platform) = make_state();
    let body = serde_json::json!({
        "update_id": 2,
        "message": {
            "message_id": 11,
            "date": 1_700_000_000,
            "chat": {"id": 42, "type": "private", "first_name": "Ada"},
            "from": {"id": 42, "is_bot": false, "first_name": "Ada"},
            "sticker": {
                "file_id": "abc", "file_unique_id": "u", "width": 512, "height": 512,
                "is_animated": false, "is_video": false, "type": "regular"
            }
        }
    });
    let resp = build_router(state)
        .oneshot(post_webhook(body.to_string()))
        .await
        .unwrap();

    // Either ignored as unsupported or rejected as undecodable, never dispatched.
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(platform.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_webhook_rejects_oversized_payload() {
    let (state, platform) = make_state();
    let huge = format!(r#"{{"pad":"{}"}}"#, "x".repeat(WEBHOOK_MAX_BODY + 1));
    let resp = build_router(state).oneshot(post_webhook(huge)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "error");
    assert!(platform.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_webhook_reports_dispatch_failure() {
    let (state, _) = make_state();
    let body = serde_json::json!({
        "update_id": 3,
        "callback_query": {
            "id": "cbq-1",
            "from": {"id": 42, "is_bot": false, "first_name": "Ada"},
            "chat_instance": "ci",
            "data": "en"
        }
    });
    let resp = build_router(state)
        .oneshot(post_webhook(body.to_string()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["status"], "error");
}
