use crate::channels::base::{ChatPlatform, InlineButton, SentMessage};
use crate::dispatch::update::{InboundUpdate, UpdateKind};
use crate::errors::RelayError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, ChatAction, InlineKeyboardButton, InlineKeyboardMarkup, MessageId,
    Update, UpdateKind as TgUpdateKind,
};
use tracing::{debug, info};
use url::Url;

/// Telegram's message text limit. Counted in bytes here, which never
/// undercounts Telegram's UTF-16 measure.
const TELEGRAM_MAX_TEXT: usize = 4096;

pub struct TelegramChannel {
    bot: Bot,
}

impl TelegramChannel {
    pub fn new(token: &str) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }

    /// Point Telegram's webhook delivery at `url`.
    pub async fn register_webhook(&self, url: Url) -> Result<()> {
        info!("Registering Telegram webhook at {}", url);
        self.bot
            .set_webhook(url.clone())
            .await
            .with_context(|| format!("Failed to register webhook {}", url))?;
        info!("Webhook configured on {}", url);
        Ok(())
    }

    pub async fn delete_webhook(&self) -> Result<()> {
        self.bot
            .delete_webhook()
            .await
            .context("Failed to delete webhook")?;
        info!("Telegram webhook removed");
        Ok(())
    }
}

fn parse_chat_id(chat_id: &str) -> Result<ChatId> {
    let id = chat_id
        .parse::<i64>()
        .with_context(|| format!("invalid Telegram chat id: {}", chat_id))?;
    Ok(ChatId(id))
}

fn parse_message_id(message_id: &str) -> Result<MessageId> {
    let id = message_id
        .parse::<i32>()
        .with_context(|| format!("invalid Telegram message id: {}", message_id))?;
    Ok(MessageId(id))
}

#[async_trait]
impl ChatPlatform for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<SentMessage> {
        let chat = parse_chat_id(chat_id)?;
        let sent = self
            .bot
            .send_message(chat, text.to_string())
            .await
            .map_err(|e| RelayError::channel("telegram", format!("sendMessage: {e}")))?;
        Ok(SentMessage {
            chat_id: chat_id.to_string(),
            message_id: sent.id.0.to_string(),
        })
    }

    async fn send_with_buttons(
        &self,
        chat_id: &str,
        text: &str,
        buttons: &[InlineButton],
    ) -> Result<SentMessage> {
        let chat = parse_chat_id(chat_id)?;
        let rows: Vec<Vec<InlineKeyboardButton>> = buttons
            .iter()
            .map(|b| vec![InlineKeyboardButton::callback(b.label.clone(), b.payload.clone())])
            .collect();
        let sent = self
            .bot
            .send_message(chat, text.to_string())
            .reply_markup(InlineKeyboardMarkup::new(rows))
            .await
            .map_err(|e| RelayError::channel("telegram", format!("sendMessage (keyboard): {e}")))?;
        Ok(SentMessage {
            chat_id: chat_id.to_string(),
            message_id: sent.id.0.to_string(),
        })
    }

    async fn edit_text(&self, message: &SentMessage, text: &str) -> Result<()> {
        let chat = parse_chat_id(&message.chat_id)?;
        let id = parse_message_id(&message.message_id)?;
        self.bot
            .edit_message_text(chat, id, text.to_string())
            .await
            .map_err(|e| RelayError::channel("telegram", format!("editMessageText: {e}")))?;
        Ok(())
    }

    async fn send_typing(&self, chat_id: &str) -> Result<()> {
        let chat = parse_chat_id(chat_id)?;
        self.bot
            .send_chat_action(chat, ChatAction::Typing)
            .await
            .map_err(|e| RelayError::channel("telegram", format!("sendChatAction: {e}")))?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()))
            .await
            .map_err(|e| RelayError::channel("telegram", format!("answerCallbackQuery: {e}")))?;
        Ok(())
    }

    fn max_message_len(&self) -> usize {
        TELEGRAM_MAX_TEXT
    }
}

/// Decode a raw webhook body. `Ok(None)` means a well-formed update the relay
/// does not handle (edited messages, photos, channel posts, ...).
pub fn parse_update(body: &[u8]) -> Result<Option<InboundUpdate>> {
    let update: Update =
        serde_json::from_slice(body).context("webhook body is not a Telegram update")?;
    let inbound = to_inbound(update);
    if inbound.is_none() {
        debug!("ignoring unsupported Telegram update");
    }
    Ok(inbound)
}

/// Convert a teloxide update into the dispatcher's envelope.
pub fn to_inbound(update: Update) -> Option<InboundUpdate> {
    match update.kind {
        TgUpdateKind::Message(msg) => {
            let user = msg.from.as_ref()?;
            let text = msg.text()?;
            Some(InboundUpdate {
                user_id: user.id.0.to_string(),
                chat_id: msg.chat.id.0.to_string(),
                kind: UpdateKind::from_text(text),
            })
        }
        TgUpdateKind::CallbackQuery(query) => {
            let origin = query.message.as_ref().map(|m| SentMessage {
                chat_id: m.chat().id.0.to_string(),
                message_id: m.id().0.to_string(),
            });
            // Callbacks from inline-mode messages carry no chat; answer in the user's DM.
            let chat_id = origin
                .as_ref()
                .map_or_else(|| query.from.id.0.to_string(), |o| o.chat_id.clone());
            Some(InboundUpdate {
                user_id: query.from.id.0.to_string(),
                chat_id,
                kind: UpdateKind::Callback {
                    callback_id: query.id.0.clone(),
                    origin,
                    data: query.data.clone().unwrap_or_default(),
                },
            })
        }
        _ => None,
    }
}
