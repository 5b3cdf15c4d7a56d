use thiserror::Error;

/// Typed error hierarchy for telerelay.
///
/// Use at module boundaries (provider calls, platform calls, config validation).
/// Internal/leaf functions can keep using `anyhow::Result`; the `Internal` variant
/// converts through the `?` operator.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {message}")]
    Provider { message: String, retryable: bool },

    #[error("Rate limit exceeded")]
    RateLimit { retry_after: Option<u64> },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Channel error: {channel}: {message}")]
    Channel { channel: String, message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience alias for results using `RelayError`.
pub type RelayResult<T> = std::result::Result<T, RelayError>;

impl RelayError {
    /// Whether this error is transient. Nothing in the relay retries, but the
    /// classification is logged alongside downstream failures.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider { retryable, .. } => *retryable,
            Self::RateLimit { .. } => true,
            Self::Auth(_) | Self::Config(_) | Self::Channel { .. } | Self::Internal(_) => false,
        }
    }

    pub fn channel(channel: &str, err: impl std::fmt::Display) -> Self {
        Self::Channel {
            channel: channel.to_string(),
            message: err.to_string(),
        }
    }
}
