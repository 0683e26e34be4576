//! Endpoint and retry configuration.
//!
//! Both are plain per-client values. Two clients configured against
//! different endpoints never interfere — there is no process-wide
//! transport state to race on.

use std::time::Duration;

// ─── Endpoint ────────────────────────────────────────────────────────────────

/// Environment variable naming the chat-completion endpoint base URL.
pub const BASE_URL_ENV: &str = "OLLAMA_BASE_URL";

/// Fallback endpoint when the environment does not name one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Placeholder credential. Ollama ignores the bearer token but the
/// OpenAI-compatible route requires one to be present.
pub const DEFAULT_API_KEY: &str = "ollama";

/// Where requests go and how they authenticate.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub base_url: String,
    pub api_key: String,
}

impl EndpointConfig {
    /// Resolve from the environment (`OLLAMA_BASE_URL`), falling back to
    /// the built-in default endpoint.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: DEFAULT_API_KEY.to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// The chat completions route under this endpoint.
    pub(crate) fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// The model listing route (used by health checks).
    pub(crate) fn models_url(&self) -> String {
        format!("{}/v1/models", self.base_url.trim_end_matches('/'))
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

// ─── Retry ───────────────────────────────────────────────────────────────────

/// Retry and timeout policy for remote calls.
///
/// The backoff delay doubles per attempt from `base_delay` and is capped
/// at `max_delay`. `max_attempts` bounds the loop; per-attempt wall clock
/// is bounded by the transport timeouts, so the worst-case call duration
/// is finite and caller-controlled.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum request attempts, first try included. Treated as at least 1.
    pub max_attempts: u32,
    /// Backoff before the second attempt.
    pub base_delay: Duration,
    /// Backoff ceiling.
    pub max_delay: Duration,
    /// TCP connection timeout.
    pub connect_timeout: Duration,
    /// Total per-request timeout.
    pub request_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl RetryConfig {
    /// Backoff preceding `attempt` (1-based). The first attempt never waits.
    pub(crate) fn backoff_delay(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exp = (attempt - 2).min(31);
        let delay = self.base_delay.saturating_mul(2u32.saturating_pow(exp));
        delay.min(self.max_delay)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_caps() {
        let retry = RetryConfig {
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(4),
            ..RetryConfig::default()
        };
        assert_eq!(retry.backoff_delay(1), Duration::ZERO);
        assert_eq!(retry.backoff_delay(2), Duration::from_millis(500));
        assert_eq!(retry.backoff_delay(3), Duration::from_secs(1));
        assert_eq!(retry.backoff_delay(4), Duration::from_secs(2));
        assert_eq!(retry.backoff_delay(5), Duration::from_secs(4));
        // Capped from here on
        assert_eq!(retry.backoff_delay(6), Duration::from_secs(4));
        assert_eq!(retry.backoff_delay(60), Duration::from_secs(4));
    }

    #[test]
    fn test_from_env_uses_variable_when_set() {
        std::env::set_var(BASE_URL_ENV, "http://10.0.0.7:11434");
        let endpoint = EndpointConfig::from_env();
        assert_eq!(endpoint.base_url, "http://10.0.0.7:11434");
        std::env::remove_var(BASE_URL_ENV);
    }

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        let endpoint = EndpointConfig::new("http://localhost:11434/");
        assert_eq!(
            endpoint.completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
        assert_eq!(endpoint.models_url(), "http://localhost:11434/v1/models");
    }

    #[test]
    fn test_default_api_key_is_placeholder() {
        let endpoint = EndpointConfig::new(DEFAULT_BASE_URL);
        assert_eq!(endpoint.api_key, DEFAULT_API_KEY);
        let keyed = endpoint.with_api_key("secret");
        assert_eq!(keyed.api_key, "secret");
    }
}
