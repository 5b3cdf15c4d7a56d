use crate::config::Config;
use crate::errors::RelayError;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load configuration from a JSON file, or defaults when no path is given.
///
/// Environment overrides are applied separately by [`apply_env_overrides`].
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let Some(path) = config_path else {
        return Ok(Config::default());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config JSON from {}", path.display()))?;
    debug!("loaded config from {}", path.display());
    Ok(config)
}

macro_rules! define_env_overrides {
    ($( $env:literal => $($path:ident).+ );* $(;)?) => {
        /// Environment variables that overwrite string config fields.
        pub const ENV_OVERRIDES: &[&str] = &[$($env,)* "PORT"];

        fn apply_string_overrides<F>(config: &mut Config, lookup: &F)
        where
            F: Fn(&str) -> Option<String>,
        {
            $(
                if let Some(val) = lookup($env)
                    && !val.trim().is_empty()
                {
                    config.$($path).+ = val.trim().to_string();
                }
            )*
        }
    };
}

define_env_overrides! {
    "TELEGRAM_TOKEN" => telegram.token;
    "GROQ_API_KEY"   => provider.api_key;
    "WEBHOOK_URL"    => telegram.webhook_url;
    "LLM_API_BASE"   => provider.api_base;
    "LLM_MODEL"      => provider.model;
}

/// Apply overrides from the process environment. Set, non-empty values win
/// over whatever the config file contained.
pub fn apply_env_overrides(config: &mut Config) -> Result<(), RelayError> {
    apply_overrides_from(config, |name| std::env::var(name).ok())
}

/// Same as [`apply_env_overrides`] with an injectable variable source.
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), RelayError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_string_overrides(config, &lookup);

    if let Some(port) = lookup("PORT")
        && !port.trim().is_empty()
    {
        config.gateway.port = port
            .trim()
            .parse()
            .map_err(|e| RelayError::Config(format!("PORT is not a valid port ({port}): {e}")))?;
    }
    Ok(())
}
