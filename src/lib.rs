//! ModelRelay — resilient chat-completion client for local LLM endpoints.
//!
//! Two pieces:
//! - [`client`] — a stateless façade over an OpenAI-compatible chat
//!   completions endpoint (Ollama by default): bounded exponential-backoff
//!   retry, single and multi-sample generation, and persistent
//!   copy-on-append conversation histories that branch cheaply.
//! - [`extract`] — tolerant extraction of a JSON value embedded in
//!   free-form model output.
//!
//! ```no_run
//! use modelrelay::{extract_json, CompletionClient};
//!
//! # async fn run() -> Result<(), modelrelay::ClientError> {
//! let client = CompletionClient::new("qwen3-next:latest")?;
//! let completion = client
//!     .complete("Summarize as JSON.", "You are a research assistant.", None, None)
//!     .await?;
//! let value = extract_json(&completion.text);
//! # let _ = value;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod extract;

pub use client::{
    ClientError, Completion, CompletionClient, EndpointConfig, History, Message, RetryConfig,
    Role, TranscriptSink, AVAILABLE_MODELS, SUPPORTED_MODELS,
};
pub use extract::extract_json;
