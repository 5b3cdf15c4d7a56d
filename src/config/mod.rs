pub mod loader;
pub mod schema;

pub use loader::{ENV_OVERRIDES, apply_env_overrides, apply_overrides_from, load_config};
pub use schema::{
    ChatConfig, Config, DEFAULT_WEBHOOK_URL, GatewayConfig, ProviderConfig, SessionConfig,
    TelegramConfig,
};
