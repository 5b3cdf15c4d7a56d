// Shared test helpers; not all items used by every test binary.
#![allow(unused)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use telerelay::channels::{ChatPlatform, InlineButton, SentMessage};
use telerelay::config::ChatConfig;
use telerelay::dispatch::{Command, Dispatcher, InboundUpdate, UpdateKind};
use telerelay::providers::base::{ChatRequest, LLMProvider, LLMResponse, Message};
use telerelay::session::SessionManager;

/// Everything the fake platform was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Text {
        chat_id: String,
        message_id: String,
        text: String,
    },
    Picker {
        chat_id: String,
        text: String,
        buttons: Vec<InlineButton>,
    },
    Edit {
        chat_id: String,
        message_id: String,
        text: String,
    },
    Typing {
        chat_id: String,
    },
    CallbackAnswer {
        callback_id: String,
    },
}

#[derive(Default)]
pub struct FakePlatform {
    pub log: std::sync::Mutex<Vec<Outbound>>,
    next_id: AtomicUsize,
    limit: Option<usize>,
}

impl FakePlatform {
    /// Platform rejecting messages longer than `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Edits grouped by the message they target, in send order.
    pub fn edits_by_message(&self) -> Vec<(String, Vec<String>)> {
        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for out in self.outbound() {
            match out {
                Outbound::Text { message_id, .. } => grouped.push((message_id, Vec::new())),
                Outbound::Edit {
                    message_id, text, ..
                } => {
                    if let Some((_, edits)) = grouped.iter_mut().find(|(id, _)| *id == message_id) {
                        edits.push(text);
                    }
                }
                _ => {}
            }
        }
        grouped
    }

    pub fn outbound(&self) -> Vec<Outbound> {
        self.log.lock().unwrap().clone()
    }

    /// Outbound actions minus typing signals, whose count depends on timing.
    pub fn visible(&self) -> Vec<Outbound> {
        self.outbound()
            .into_iter()
            .filter(|o| !matches!(o, Outbound::Typing { .. }))
            .collect()
    }

    pub fn edits(&self) -> Vec<String> {
        self.outbound()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Edit { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    fn sent(&self, chat_id: &str) -> SentMessage {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 100;
        SentMessage {
            chat_id: chat_id.to_string(),
            message_id: id.to_string(),
        }
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    fn name(&self) -> &str {
        "fake"
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> anyhow::Result<SentMessage> {
        let sent = self.sent(chat_id);
        self.log.lock().unwrap().push(Outbound::Text {
            chat_id: chat_id.to_string(),
            message_id: sent.message_id.clone(),
            text: text.to_string(),
        });
        Ok(sent)
    }

    async fn send_with_buttons(
        &self,
        chat_id: &str,
        text: &str,
        buttons: &[InlineButton],
    ) -> anyhow::Result<SentMessage> {
        self.log.lock().unwrap().push(Outbound::Picker {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            buttons: buttons.to_vec(),
        });
        Ok(self.sent(chat_id))
    }

    async fn edit_text(&self, message: &SentMessage, text: &str) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(Outbound::Edit {
            chat_id: message.chat_id.clone(),
            message_id: message.message_id.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_typing(&self, chat_id: &str) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(Outbound::Typing {
            chat_id: chat_id.to_string(),
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(Outbound::CallbackAnswer {
            callback_id: callback_id.to_string(),
        });
        Ok(())
    }

    fn max_message_len(&self) -> usize {
        self.limit.unwrap_or(usize::MAX)
    }
}

pub struct MockLLMProvider {
    responses: std::sync::Mutex<VecDeque<String>>,
    pub calls: std::sync::Mutex<Vec<Vec<Message>>>,
    pub default_response: String,
}

impl MockLLMProvider {
    pub fn with_responses(responses: Vec<&str>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into_iter().map(String::from).collect()),
            calls: std::sync::Mutex::new(Vec::new()),
            default_response: "Mock response".to_string(),
        }
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for MockLLMProvider {
    async fn chat(&self, req: ChatRequest) -> anyhow::Result<LLMResponse> {
        self.calls.lock().unwrap().push(req.messages);
        let content = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone());
        Ok(LLMResponse {
            content: Some(content),
            total_tokens: None,
        })
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}

/// Provider that always fails, counting attempts.
#[derive(Default)]
pub struct FailingMockProvider {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl LLMProvider for FailingMockProvider {
    async fn chat(&self, _req: ChatRequest) -> anyhow::Result<LLMResponse> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(telerelay::errors::RelayError::Provider {
            message: "service unavailable".into(),
            retryable: true,
        }
        .into())
    }

    fn default_model(&self) -> &str {
        "failing-model"
    }
}

/// Chat settings with the pauses removed.
pub fn instant_chat() -> ChatConfig {
    ChatConfig {
        settle_delay_ms: 0,
        reveal_delay_ms: 0,
        ..ChatConfig::default()
    }
}

pub fn dispatcher_with(
    provider: Arc<dyn LLMProvider>,
    chat: ChatConfig,
) -> (Dispatcher, Arc<FakePlatform>) {
    dispatcher_on(FakePlatform::default(), provider, chat)
}

pub fn dispatcher_on(
    platform: FakePlatform,
    provider: Arc<dyn LLMProvider>,
    chat: ChatConfig,
) -> (Dispatcher, Arc<FakePlatform>) {
    let platform = Arc::new(platform);
    let dispatcher = Dispatcher::new(
        platform.clone(),
        provider,
        Arc::new(SessionManager::new()),
        chat,
    );
    (dispatcher, platform)
}

pub fn command(user: &str, cmd: Command) -> InboundUpdate {
    InboundUpdate {
        user_id: user.to_string(),
        chat_id: user.to_string(),
        kind: UpdateKind::Command(cmd),
    }
}

pub fn text(user: &str, body: &str) -> InboundUpdate {
    InboundUpdate {
        user_id: user.to_string(),
        chat_id: user.to_string(),
        kind: UpdateKind::from_text(body),
    }
}

pub fn language_pick(user: &str, origin: &SentMessage, code: &str) -> InboundUpdate {
    InboundUpdate {
        user_id: user.to_string(),
        chat_id: origin.chat_id.clone(),
        kind: UpdateKind::Callback {
            callback_id: format!("cb-{user}"),
            origin: Some(origin.clone()),
            data: code.to_string(),
        },
    }
}
