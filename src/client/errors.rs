//! Client error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. The taxonomy
//! is split along one line: failures another attempt may fix (connection,
//! timeout, retryable HTTP statuses, malformed payloads) and failures it
//! cannot (unknown model, caller misuse, non-retryable statuses).

use thiserror::Error;

/// Errors from the completion client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The requested model identifier is not in the allow-list.
    /// Surfaced before any network activity; never retried.
    #[error("model '{model}' not supported (available: {})", available.join(", "))]
    UnsupportedModel {
        model: String,
        available: &'static [&'static str],
    },

    /// TCP/HTTP connection to the endpoint failed.
    #[error("connection failed to {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    /// The endpoint did not respond within the configured timeout.
    #[error("request timeout after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Non-2xx HTTP response from the endpoint.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response arrived but did not carry the expected shape.
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    /// The caller asked for something the remote contract cannot express.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// Retry budget exhausted; wraps the last underlying failure.
    #[error("remote call failed after {attempts} attempts")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// Whether another attempt may succeed.
    ///
    /// Connection failures, timeouts, and malformed payloads are transient.
    /// HTTP 408 and 429 signal pressure that backs off; 5xx covers local
    /// model servers that return 500 for transient generation failures.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Connection { .. }
                | ClientError::Timeout { .. }
                | ClientError::MalformedResponse { .. }
                | ClientError::Http { status: 408, .. }
                | ClientError::Http { status: 429, .. }
                | ClientError::Http {
                    status: 500..=599,
                    ..
                }
        )
    }
}
