use crate::errors::RelayError;
use serde_json::Value;
use tracing::{error, warn};

/// Maps non-success HTTP responses from a completion API into typed errors.
pub struct ProviderErrorHandler;

impl ProviderErrorHandler {
    /// Parse an API error body into a `Provider` error.
    pub fn parse_api_error(status: u16, error_text: &str) -> RelayError {
        let retryable = matches!(status, 500 | 502 | 503);

        // OpenAI-style bodies: {"error": {"type": "...", "message": "..."}}
        if let Ok(error_json) = serde_json::from_str::<Value>(error_text)
            && let Some(err) = error_json.get("error")
        {
            let error_type = err
                .get("type")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown");
            let error_msg = err
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown error");

            let code = err.get("code").and_then(Value::as_str);
            if error_type == "model_not_found" || code == Some("model_not_found") {
                return RelayError::Provider {
                    message: format!(
                        "Model not found: {}. Set provider.model (or LLM_MODEL) to a model the endpoint serves.",
                        error_msg
                    ),
                    retryable: false,
                };
            }

            return RelayError::Provider {
                message: format!("API error ({}): {}", error_type, error_msg),
                retryable,
            };
        }

        RelayError::Provider {
            message: format!("API error ({}): {}", status, error_text),
            retryable,
        }
    }

    pub fn handle_rate_limit(status: u16, retry_after: Option<u64>) -> RelayError {
        if let Some(seconds) = retry_after {
            warn!("Rate limit hit. Retry after {} seconds", seconds);
        } else {
            warn!("Rate limit hit (status: {})", status);
        }
        RelayError::RateLimit { retry_after }
    }

    pub fn handle_auth_error(status: u16, error_text: &str) -> RelayError {
        warn!("Authentication error (status: {}): {}", status, error_text);
        RelayError::Auth(format!(
            "Authentication failed. Please check your API key. Error: {}",
            error_text
        ))
    }

    /// Check an HTTP response for errors (rate limit, auth, generic API errors).
    /// Returns the response body as JSON on success.
    pub async fn check_response(
        resp: reqwest::Response,
        provider: &str,
    ) -> Result<Value, anyhow::Error> {
        let status = resp.status();
        if !status.is_success() {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            let error_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());

            error!("{} provider returned HTTP {}", provider, status.as_u16());
            let err = match status.as_u16() {
                429 => Self::handle_rate_limit(429, retry_after),
                code @ (401 | 403) => Self::handle_auth_error(code, &error_text),
                code => Self::parse_api_error(code, &error_text),
            };
            return Err(err.into());
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse {} API response: {}", provider, e))?;

        // Some gateways report failures in a 200 body
        if let Some(error_val) = json.get("error") {
            error!("{} provider returned an error body", provider);
            let wrapped = serde_json::json!({ "error": error_val }).to_string();
            return Err(Self::parse_api_error(200, &wrapped).into());
        }

        Ok(json)
    }
}
