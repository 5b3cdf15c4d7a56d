use crate::channels::SentMessage;

/// One inbound event, already stripped of platform types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    pub user_id: String,
    pub chat_id: String,
    pub kind: UpdateKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    Command(Command),
    Text(String),
    /// Inline button press; `origin` is the message carrying the keyboard.
    Callback {
        callback_id: String,
        origin: Option<SentMessage>,
        data: String,
    },
}

impl UpdateKind {
    /// Slash-prefixed text is a command, anything else is free text.
    pub fn from_text(text: &str) -> Self {
        match Command::parse(text) {
            Some(cmd) => UpdateKind::Command(cmd),
            None => UpdateKind::Text(text.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Clear,
    Other(String),
}

impl Command {
    /// Parse `/name`, `/name@BotName` and `/name args`.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.trim_start().split_whitespace().next()?;
        let name = token.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or_default().to_lowercase();
        Some(match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "clear" => Command::Clear,
            _ => Command::Other(name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/clear"), Some(Command::Clear));
    }

    #[test]
    fn test_parse_bot_suffix_and_args() {
        assert_eq!(Command::parse("/start@relay_bot"), Some(Command::Start));
        assert_eq!(Command::parse("/Clear now please"), Some(Command::Clear));
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            Command::parse("/weather paris"),
            Some(Command::Other("weather".to_string()))
        );
    }

    #[test]
    fn test_free_text_is_not_a_command() {
        assert_eq!(Command::parse("hello /start"), None);
        assert_eq!(Command::parse("   "), None);
        assert_eq!(
            UpdateKind::from_text("what is rust?"),
            UpdateKind::Text("what is rust?".to_string())
        );
    }
}
