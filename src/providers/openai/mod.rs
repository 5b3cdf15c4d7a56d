use crate::providers::base::{ChatRequest, LLMProvider, LLMResponse};
use crate::providers::errors::ProviderErrorHandler;
use crate::providers::provider_http_client;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

/// Groq's OpenAI-compatible chat completions endpoint.
pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAIProvider {
    api_key: String,
    default_model: String,
    base_url: String,
    provider_name: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(api_key: String, default_model: Option<String>) -> Self {
        Self::with_config(
            api_key,
            default_model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            GROQ_API_URL.to_string(),
            "Groq".to_string(),
        )
    }

    pub fn with_config(
        api_key: String,
        default_model: String,
        base_url: String,
        provider_name: String,
    ) -> Self {
        Self {
            api_key,
            default_model,
            base_url,
            provider_name,
            max_tokens: None,
            temperature: None,
            client: provider_http_client(),
        }
    }

    /// Sampling parameters sent with every request; `None` leaves the API default.
    #[must_use]
    pub fn with_sampling(mut self, max_tokens: Option<u32>, temperature: Option<f32>) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn build_payload(&self, req: &ChatRequest) -> Value {
        let messages: Vec<Value> = req
            .messages
            .iter()
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.content,
                })
            })
            .collect();

        let mut payload = json!({
            "model": self.default_model,
            "messages": messages,
        });
        if let Some(max_tokens) = self.max_tokens {
            payload["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            payload["temperature"] = json!(temperature);
        }
        payload
    }

    fn parse_response(&self, json: &Value) -> Result<LLMResponse> {
        let choice = json["choices"]
            .as_array()
            .and_then(|arr| arr.first())
            .with_context(|| format!("No choices in {} response", self.provider_name))?;

        let content = choice["message"]["content"]
            .as_str()
            .map(std::string::ToString::to_string);
        let total_tokens = json
            .get("usage")
            .and_then(|u| u.get("total_tokens"))
            .and_then(Value::as_u64);

        Ok(LLMResponse {
            content,
            total_tokens,
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn chat(&self, req: ChatRequest) -> Result<LLMResponse> {
        let payload = self.build_payload(&req);
        debug!(
            "{} chat request: model={}, messages={}",
            self.provider_name,
            payload["model"],
            req.messages.len()
        );

        let resp = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {} API", self.provider_name))?;

        let json = ProviderErrorHandler::check_response(resp, &self.provider_name).await?;
        let response = self.parse_response(&json)?;
        if let Some(tokens) = response.total_tokens {
            debug!("{} usage: {} tokens", self.provider_name, tokens);
        }
        Ok(response)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}
