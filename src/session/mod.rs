pub mod eviction;
pub mod manager;

pub use eviction::{EvictionPolicy, IdleExpiry, NeverEvict};
pub use manager::{Session, SessionManager, SystemPromptPlacement};
