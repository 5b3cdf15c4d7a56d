pub mod base;
pub mod telegram;

pub use base::{ChatPlatform, InlineButton, SentMessage};
pub use telegram::TelegramChannel;
