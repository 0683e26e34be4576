//! Completion Client — retrying chat-completion calls with branching history.
//!
//! This module handles all communication with the model endpoint:
//! - Single and multi-sample chat completions over the OpenAI-compatible
//!   `/v1/chat/completions` route
//! - Bounded exponential-backoff retry with retryable/fatal error tagging
//! - Persistent (copy-on-append) conversation histories for branching
//! - Static model allow-listing, checked before any network activity
//! - Optional role-tagged exchange transcripts for diagnostics

pub mod client;
pub mod config;
pub mod errors;
pub mod history;
pub mod models;
pub mod transcript;
pub mod types;

// Re-exports for convenience
pub use client::{Completion, CompletionClient, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
pub use config::{EndpointConfig, RetryConfig, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use errors::ClientError;
pub use history::History;
pub use models::{resolve_model, AVAILABLE_MODELS, SUPPORTED_MODELS};
pub use transcript::TranscriptSink;
pub use types::{Message, Role};
