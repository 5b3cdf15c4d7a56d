pub mod prompt;
pub mod reveal;
pub mod typing;
pub mod update;

pub use prompt::Persona;
pub use reveal::reveal_prefixes;
pub use typing::TypingIndicator;
pub use update::{Command, InboundUpdate, UpdateKind};

use crate::channels::base::split_message;
use crate::channels::{ChatPlatform, InlineButton, SentMessage};
use crate::config::ChatConfig;
use crate::errors::RelayError;
use crate::locale::{self, Language};
use crate::providers::base::{LLMProvider, Message};
use crate::session::SessionManager;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Routes inbound updates to their handlers and drives the reply lifecycle.
pub struct Dispatcher {
    platform: Arc<dyn ChatPlatform>,
    provider: Arc<dyn LLMProvider>,
    sessions: Arc<SessionManager>,
    chat: ChatConfig,
}

impl Dispatcher {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        provider: Arc<dyn LLMProvider>,
        sessions: Arc<SessionManager>,
        chat: ChatConfig,
    ) -> Self {
        Self {
            platform,
            provider,
            sessions,
            chat,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn model(&self) -> &str {
        self.provider.default_model()
    }

    /// Handle one update. Errors returned here are transport failures on
    /// command replies; free-text failures are answered with an apology.
    pub async fn dispatch(&self, update: InboundUpdate) -> Result<()> {
        let InboundUpdate {
            user_id,
            chat_id,
            kind,
        } = update;

        match kind {
            UpdateKind::Command(Command::Start) => self.handle_start(&user_id, &chat_id).await,
            UpdateKind::Command(Command::Help) => self.handle_help(&user_id, &chat_id).await,
            UpdateKind::Command(Command::Clear) => self.handle_clear(&user_id, &chat_id).await,
            UpdateKind::Command(Command::Other(name)) => {
                debug!("ignoring unknown command /{} from user {}", name, user_id);
                Ok(())
            }
            UpdateKind::Text(text) => {
                self.handle_message(&user_id, &chat_id, &text).await;
                Ok(())
            }
            UpdateKind::Callback {
                callback_id,
                origin,
                data,
            } => {
                self.handle_language_choice(&user_id, &callback_id, origin.as_ref(), &data)
                    .await
            }
        }
    }

    async fn handle_start(&self, user_id: &str, chat_id: &str) -> Result<()> {
        match self.sessions.language(user_id).await {
            None => {
                info!("start: offering language picker to user {}", user_id);
                let buttons: Vec<InlineButton> = Language::ALL
                    .iter()
                    .map(|lang| InlineButton::new(lang.label(), lang.code()))
                    .collect();
                self.platform
                    .send_with_buttons(chat_id, locale::WELCOME_PICKER, &buttons)
                    .await
                    .context("Failed to send language picker")?;
            }
            Some(lang) => {
                info!("start: greeting user {} in {}", user_id, lang);
                self.platform
                    .send_text(chat_id, locale::greeting(lang))
                    .await
                    .context("Failed to send greeting")?;
            }
        }
        Ok(())
    }

    async fn handle_language_choice(
        &self,
        user_id: &str,
        callback_id: &str,
        origin: Option<&SentMessage>,
        data: &str,
    ) -> Result<()> {
        let Some(lang) = Language::from_code(data) else {
            warn!(
                "unknown callback data {:?} from user {}, acknowledging only",
                data, user_id
            );
            return self.platform.answer_callback(callback_id).await;
        };

        self.sessions.set_language(user_id, lang).await;
        info!("user {} selected language {}", user_id, lang);

        self.platform
            .answer_callback(callback_id)
            .await
            .context("Failed to answer callback query")?;

        match origin {
            Some(message) => self
                .platform
                .edit_text(message, locale::language_selected(lang))
                .await
                .context("Failed to edit language picker")?,
            None => warn!(
                "callback from user {} has no accessible origin message, skipping edit",
                user_id
            ),
        }
        Ok(())
    }

    async fn handle_help(&self, user_id: &str, chat_id: &str) -> Result<()> {
        let lang = self.sessions.language(user_id).await.unwrap_or_default();
        self.platform
            .send_text(chat_id, locale::help(lang))
            .await
            .context("Failed to send help text")?;
        Ok(())
    }

    async fn handle_clear(&self, user_id: &str, chat_id: &str) -> Result<()> {
        let had_session = self.sessions.clear_history(user_id).await;
        debug!("cleared history for user {} (existed: {})", user_id, had_session);
        let lang = self.sessions.language(user_id).await.unwrap_or_default();
        self.platform
            .send_text(chat_id, locale::history_cleared(lang))
            .await
            .context("Failed to send clear confirmation")?;
        Ok(())
    }

    /// Free-text turn. Never fails: errors become the localized apology.
    async fn handle_message(&self, user_id: &str, chat_id: &str, text: &str) {
        let lang = self.sessions.language(user_id).await.unwrap_or_default();

        if text.trim().is_empty() {
            if let Err(e) = self
                .platform
                .send_text(chat_id, locale::empty_message(lang))
                .await
            {
                error!("Failed to send empty-message warning to {}: {:#}", chat_id, e);
            }
            return;
        }

        if let Err(e) = self.run_turn(user_id, chat_id, text).await {
            let retryable = e
                .downcast_ref::<RelayError>()
                .is_some_and(RelayError::is_retryable);
            error!(
                "Turn failed for user {} (transient: {}): {:#}",
                user_id, retryable, e
            );
            if let Err(e) = self
                .platform
                .send_text(chat_id, locale::generic_error(lang))
                .await
            {
                error!("Failed to send apology to {}: {:#}", chat_id, e);
            }
        }
    }

    async fn run_turn(&self, user_id: &str, chat_id: &str, text: &str) -> Result<()> {
        debug!("user {} says: {}", user_id, text);
        let context = self
            .sessions
            .begin_turn(
                user_id,
                text,
                self.chat.persona.system_instruction(),
                self.chat.system_prompt_placement,
            )
            .await;

        let reply = {
            let _typing = TypingIndicator::start(
                self.platform.clone(),
                chat_id.to_string(),
                self.chat.typing_interval(),
            );
            self.provider
                .complete(context)
                .await
                .context("Completion request failed")?
        };
        debug!("reply for user {}: {}", user_id, reply);

        self.sessions
            .append(user_id, Message::assistant(reply.clone()))
            .await;

        tokio::time::sleep(self.chat.settle_delay()).await;
        self.reveal(chat_id, &reply).await
    }

    /// Post a placeholder and grow it to the reply a few words at a time.
    /// Replies over the platform's message limit continue in further messages.
    async fn reveal(&self, chat_id: &str, reply: &str) -> Result<()> {
        let normalized = reply.split_whitespace().collect::<Vec<_>>().join(" ");
        let parts = split_message(&normalized, self.platform.max_message_len());
        if parts.len() > 1 {
            debug!(
                "reply for chat {} spans {} {} messages",
                chat_id,
                parts.len(),
                self.platform.name()
            );
        }

        for (n, part) in parts.iter().enumerate() {
            if n > 0 {
                tokio::time::sleep(self.chat.reveal_delay()).await;
            }
            self.reveal_part(chat_id, part)
                .await
                .with_context(|| format!("Failed to reveal reply part {}", n + 1))?;
        }
        Ok(())
    }

    async fn reveal_part(&self, chat_id: &str, part: &str) -> Result<()> {
        let placeholder = self
            .platform
            .send_text(chat_id, &self.chat.placeholder)
            .await
            .with_context(|| format!("Failed to send placeholder via {}", self.platform.name()))?;

        let mut shown = self.chat.placeholder.clone();
        let prefixes = reveal_prefixes(part, self.chat.words_per_edit);
        let last = prefixes.len().saturating_sub(1);
        for (i, prefix) in prefixes.into_iter().enumerate() {
            // Platforms reject edits that leave the text unchanged
            if prefix == shown {
                continue;
            }
            self.platform
                .edit_text(&placeholder, &prefix)
                .await
                .with_context(|| format!("Failed to edit reply (step {})", i + 1))?;
            shown = prefix;
            if i < last {
                tokio::time::sleep(self.chat.reveal_delay()).await;
            }
        }
        Ok(())
    }
}
