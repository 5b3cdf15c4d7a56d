use crate::channels::ChatPlatform;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Periodic typing indicator. Sends immediately, then every `interval`,
/// until the guard is dropped.
pub struct TypingIndicator {
    handle: JoinHandle<()>,
}

impl TypingIndicator {
    pub fn start(platform: Arc<dyn ChatPlatform>, chat_id: String, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = platform.send_typing(&chat_id).await {
                    debug!("typing indicator for chat {} failed: {:#}", chat_id, e);
                }
            }
        });
        Self { handle }
    }
}

impl Drop for TypingIndicator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
