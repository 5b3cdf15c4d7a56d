use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Who authored a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: Option<String>,
    /// Total token count reported by the provider (if available).
    pub total_tokens: Option<u64>,
}

/// Messages for a single chat completion. Model and sampling are fixed by
/// the provider's configuration.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn chat(&self, req: ChatRequest) -> anyhow::Result<LLMResponse>;

    fn default_model(&self) -> &str;

    /// One request, one reply: returns the top completion's text.
    /// No retry; a missing or blank completion is an error.
    async fn complete(&self, messages: Vec<Message>) -> anyhow::Result<String> {
        let response = self.chat(ChatRequest::new(messages)).await?;
        response
            .content
            .filter(|c| !c.trim().is_empty())
            .context("completion contained no text")
    }
}
