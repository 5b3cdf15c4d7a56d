use crate::session::Session;
use chrono::{DateTime, Duration, Utc};

/// Decides which sessions the periodic sweep drops.
pub trait EvictionPolicy: Send + Sync {
    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool;

    /// Whether a background sweep is worth scheduling at all.
    fn needs_sweep(&self) -> bool {
        true
    }
}

/// Keeps every session for the lifetime of the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverEvict;

impl EvictionPolicy for NeverEvict {
    fn is_expired(&self, _session: &Session, _now: DateTime<Utc>) -> bool {
        false
    }

    fn needs_sweep(&self) -> bool {
        false
    }
}

/// Drops sessions that have not been touched for `idle`.
/// The stored language goes with them.
#[derive(Debug, Clone, Copy)]
pub struct IdleExpiry {
    idle: Duration,
}

impl IdleExpiry {
    pub fn new(idle: std::time::Duration) -> Self {
        Self {
            idle: Duration::from_std(idle).unwrap_or(Duration::MAX),
        }
    }
}

impl EvictionPolicy for IdleExpiry {
    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(session.updated_at) > self.idle
    }
}
