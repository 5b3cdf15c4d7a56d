use async_trait::async_trait;

/// A message the bot posted, addressable for later edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: String,
    pub message_id: String,
}

/// One inline keyboard button; `payload` comes back as callback data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub payload: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Outbound operations the dispatcher needs from a chat platform.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    fn name(&self) -> &str;

    async fn send_text(&self, chat_id: &str, text: &str) -> anyhow::Result<SentMessage>;

    /// Send a message with one button per row.
    async fn send_with_buttons(
        &self,
        chat_id: &str,
        text: &str,
        buttons: &[InlineButton],
    ) -> anyhow::Result<SentMessage>;

    /// Replace the text of a previously sent message.
    async fn edit_text(&self, message: &SentMessage, text: &str) -> anyhow::Result<()>;

    /// Show the "typing…" presence signal. Platforms expire it after a few seconds.
    async fn send_typing(&self, chat_id: &str) -> anyhow::Result<()>;

    /// Acknowledge a button press so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> anyhow::Result<()>;

    /// Longest text, in UTF-8 bytes, a single message may carry.
    fn max_message_len(&self) -> usize {
        usize::MAX
    }
}

/// Split a message into chunks of at most `limit` bytes, respecting UTF-8
/// character boundaries. Prefers paragraph, then line, then word breaks.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while remaining.len() > limit {
        // Largest char boundary <= limit
        let mut split_at = limit;
        while split_at > 0 && !remaining.is_char_boundary(split_at) {
            split_at -= 1;
        }
        if split_at == 0 {
            // single character wider than limit
            split_at = remaining
                .char_indices()
                .nth(1)
                .map_or(remaining.len(), |(i, _)| i);
        }

        let window = &remaining[..split_at];
        let (head, tail) = if let Some(idx) = window.rfind("\n\n").filter(|&i| i > 0) {
            (&remaining[..idx], &remaining[idx + 2..])
        } else if let Some(idx) = window.rfind('\n').filter(|&i| i > 0) {
            (&remaining[..idx], &remaining[idx + 1..])
        } else if let Some(idx) = window.rfind(' ').filter(|&i| i > 0) {
            (&remaining[..idx], &remaining[idx + 1..])
        } else {
            (window, &remaining[split_at..])
        };

        let head = head.trim();
        if !head.is_empty() {
            chunks.push(head.to_string());
        }
        remaining = tail;
    }

    let rest = remaining.trim();
    if !rest.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}
