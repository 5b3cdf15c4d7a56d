use crate::dispatch::prompt::Persona;
use crate::errors::{RelayError, RelayResult};
use crate::providers::openai::{DEFAULT_MODEL, GROQ_API_URL};
use crate::session::SystemPromptPlacement;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Generates a `Debug` impl that redacts secret fields.
///
/// Field specifiers:
/// - `field_name`          : printed normally via `&self.field_name`
/// - `redact(field_name)`  : `String` field: shows `[empty]` or `[REDACTED]`
macro_rules! redact_debug {
    (@field $builder:ident, $self:ident, redact($field:ident)) => {
        $builder.field(
            stringify!($field),
            &if $self.$field.is_empty() {
                "[empty]"
            } else {
                "[REDACTED]"
            },
        );
    };
    (@field $builder:ident, $self:ident, $field:ident) => {
        $builder.field(stringify!($field), &$self.$field);
    };

    (@fields $builder:ident, $self:ident,) => {};
    (@fields $builder:ident, $self:ident, redact($field:ident), $($rest:tt)*) => {
        redact_debug!(@field $builder, $self, redact($field));
        redact_debug!(@fields $builder, $self, $($rest)*);
    };
    (@fields $builder:ident, $self:ident, $field:ident, $($rest:tt)*) => {
        redact_debug!(@field $builder, $self, $field);
        redact_debug!(@fields $builder, $self, $($rest)*);
    };

    ($struct_name:ident, $($fields:tt)*) => {
        impl std::fmt::Debug for $struct_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut builder = f.debug_struct(stringify!($struct_name));
                redact_debug!(@fields builder, self, $($fields)*);
                builder.finish()
            }
        }
    };
}

/// Where the original deployment received updates.
pub const DEFAULT_WEBHOOK_URL: &str = "https://bot-1xw3.onrender.com/webhook";

// ---------------------------------------------------------------------------
// Telegram
// ---------------------------------------------------------------------------

#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TelegramConfig {
    pub token: String,
    /// Public URL Telegram posts updates to. A bare base URL gets `/webhook` appended.
    pub webhook_url: String,
    /// Register the webhook with Telegram on startup.
    pub register_webhook: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
            register_webhook: true,
        }
    }
}

redact_debug!(TelegramConfig, redact(token), webhook_url, register_webhook,);

impl TelegramConfig {
    /// Full webhook endpoint, always ending in `/webhook`.
    pub fn webhook_endpoint(&self) -> RelayResult<Url> {
        let mut url = Url::parse(self.webhook_url.trim()).map_err(|e| {
            RelayError::Config(format!(
                "telegram.webhookUrl is not a valid URL ({}): {}",
                self.webhook_url, e
            ))
        })?;
        let path = url.path().trim_end_matches('/').to_string();
        if !path.ends_with("/webhook") {
            url.set_path(&format!("{}/webhook", path));
        }
        Ok(url)
    }
}

// ---------------------------------------------------------------------------
// Completion provider
// ---------------------------------------------------------------------------

#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderConfig {
    pub api_key: String,
    /// Full chat completions URL of an OpenAI-compatible API.
    pub api_base: String,
    pub model: String,
    /// Display name used in logs and errors.
    pub name: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: GROQ_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            name: "Groq".to_string(),
            max_tokens: None,
            temperature: None,
        }
    }
}

redact_debug!(
    ProviderConfig,
    redact(api_key),
    api_base,
    model,
    name,
    max_tokens,
    temperature,
);

// ---------------------------------------------------------------------------
// HTTP gateway
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversation behaviour
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatConfig {
    pub persona: Persona,
    pub system_prompt_placement: SystemPromptPlacement,
    pub typing_interval_ms: u64,
    /// Words added to the displayed reply per edit.
    pub words_per_edit: usize,
    pub reveal_delay_ms: u64,
    /// Pause between stopping the typing indicator and posting the placeholder.
    pub settle_delay_ms: u64,
    pub placeholder: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            persona: Persona::default(),
            system_prompt_placement: SystemPromptPlacement::default(),
            typing_interval_ms: 2000,
            words_per_edit: 3,
            reveal_delay_ms: 50,
            settle_delay_ms: 500,
            placeholder: "✍️ ...".to_string(),
        }
    }
}

impl ChatConfig {
    pub fn typing_interval(&self) -> Duration {
        Duration::from_millis(self.typing_interval_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Drop sessions idle for this long. 0 keeps them for the process lifetime.
    pub idle_ttl_secs: u64,
    /// Cap on stored history entries. 0 means unbounded.
    pub max_history_messages: usize,
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: 0,
            max_history_messages: 0,
            sweep_interval_secs: 300,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub provider: ProviderConfig,
    pub gateway: GatewayConfig,
    pub chat: ChatConfig,
    pub session: SessionConfig,
}

impl Config {
    /// Validate configuration values. Missing credentials are fatal.
    pub fn validate(&self) -> RelayResult<()> {
        self.validate_credentials()?;
        self.validate_provider()?;
        self.validate_chat()?;
        self.validate_session()?;
        if self.telegram.register_webhook {
            self.telegram.webhook_endpoint()?;
        }
        Ok(())
    }

    fn validate_credentials(&self) -> RelayResult<()> {
        if self.telegram.token.trim().is_empty() {
            return Err(RelayError::Config(
                "Telegram bot token is not set (TELEGRAM_TOKEN)".into(),
            ));
        }
        if self.provider.api_key.trim().is_empty() {
            return Err(RelayError::Config(
                "completion API key is not set (GROQ_API_KEY)".into(),
            ));
        }
        Ok(())
    }

    fn validate_provider(&self) -> RelayResult<()> {
        let p = &self.provider;
        Url::parse(&p.api_base).map_err(|e| {
            RelayError::Config(format!("provider.apiBase is not a valid URL: {}", e))
        })?;
        if p.model.trim().is_empty() {
            return Err(RelayError::Config("provider.model must not be empty".into()));
        }
        if p.max_tokens == Some(0) {
            return Err(RelayError::Config("provider.maxTokens must be > 0".into()));
        }
        if let Some(t) = p.temperature
            && (!t.is_finite() || !(0.0..=2.0).contains(&t))
        {
            return Err(RelayError::Config(
                "provider.temperature must be a finite number between 0.0 and 2.0".into(),
            ));
        }
        Ok(())
    }

    fn validate_chat(&self) -> RelayResult<()> {
        let c = &self.chat;
        if c.typing_interval_ms == 0 {
            return Err(RelayError::Config("chat.typingIntervalMs must be > 0".into()));
        }
        if c.words_per_edit == 0 {
            return Err(RelayError::Config("chat.wordsPerEdit must be > 0".into()));
        }
        if c.placeholder.trim().is_empty() {
            return Err(RelayError::Config("chat.placeholder must not be empty".into()));
        }
        Ok(())
    }

    fn validate_session(&self) -> RelayResult<()> {
        if self.session.idle_ttl_secs > 0 && self.session.sweep_interval_secs == 0 {
            return Err(RelayError::Config(
                "session.sweepIntervalSecs must be > 0 when idleTtlSecs is set".into(),
            ));
        }
        Ok(())
    }
}
