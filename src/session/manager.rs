use crate::locale::Language;
use crate::providers::base::{Message, Role};
use crate::session::eviction::{EvictionPolicy, NeverEvict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Where the persona instruction lives relative to the stored history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SystemPromptPlacement {
    /// Never stored; prepended to a history snapshot for each request.
    #[default]
    Prepend,
    /// Appended to the history together with every user turn.
    PerTurn,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub key: String,
    pub history: Vec<Message>,
    pub language: Option<Language>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(key: String) -> Self {
        Self {
            key,
            history: Vec::new(),
            language: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Append an entry; `max_history == 0` means unbounded.
    pub fn push(&mut self, msg: Message, max_history: usize) {
        self.history.push(msg);
        self.updated_at = Utc::now();

        if max_history > 0 && self.history.len() > max_history {
            let drain_count = self.history.len() - max_history;
            self.history.drain(..drain_count);
        }
    }

    pub fn count_role(&self, role: Role) -> usize {
        self.history.iter().filter(|m| m.role == role).count()
    }
}

/// Per-user conversation state, kept in memory only.
///
/// Every method is one critical section. Two turns from the same user can
/// still interleave between calls, but never inside one.
pub struct SessionManager {
    sessions: Mutex<HashMap<String, Session>>,
    policy: Box<dyn EvictionPolicy>,
    max_history: usize,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_policy(Box::new(NeverEvict), 0)
    }

    pub fn with_policy(policy: Box<dyn EvictionPolicy>, max_history: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            policy,
            max_history,
        }
    }

    pub fn needs_sweep(&self) -> bool {
        self.policy.needs_sweep()
    }

    /// Snapshot of the session for `key`, creating an empty one if needed.
    pub async fn get_or_create(&self, key: &str) -> Session {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(key.to_string())
            .or_insert_with(|| Session::new(key.to_string()))
            .clone()
    }

    /// Stored language without creating a session.
    pub async fn language(&self, key: &str) -> Option<Language> {
        let sessions = self.sessions.lock().await;
        sessions.get(key).and_then(|s| s.language)
    }

    pub async fn set_language(&self, key: &str, language: Language) {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .entry(key.to_string())
            .or_insert_with(|| Session::new(key.to_string()));
        session.language = Some(language);
        session.updated_at = Utc::now();
    }

    /// Empty the history, keeping the language. Returns whether a session existed.
    pub async fn clear_history(&self, key: &str) -> bool {
        let mut sessions = self.sessions.lock().await;
        match sessions.get_mut(key) {
            Some(session) => {
                session.history.clear();
                session.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub async fn append(&self, key: &str, msg: Message) {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(key.to_string())
            .or_insert_with(|| Session::new(key.to_string()))
            .push(msg, self.max_history);
    }

    /// Record a user turn and return the message list to send to the provider.
    pub async fn begin_turn(
        &self,
        key: &str,
        user_text: &str,
        system: &str,
        placement: SystemPromptPlacement,
    ) -> Vec<Message> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .entry(key.to_string())
            .or_insert_with(|| Session::new(key.to_string()));

        match placement {
            SystemPromptPlacement::Prepend => {
                session.push(Message::user(user_text), self.max_history);
                let mut context = Vec::with_capacity(session.history.len() + 1);
                context.push(Message::system(system));
                context.extend(session.history.iter().cloned());
                context
            }
            SystemPromptPlacement::PerTurn => {
                session.push(Message::system(system), self.max_history);
                session.push(Message::user(user_text), self.max_history);
                session.history.clone()
            }
        }
    }

    /// Apply the eviction policy. Returns how many sessions were dropped.
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| !self.policy.is_expired(s, now));
        let removed = before - sessions.len();
        if removed > 0 {
            debug!("evicted {} idle session(s)", removed);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
