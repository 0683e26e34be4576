//! Completion client for the OpenAI-compatible chat completions route.
//!
//! Owns the retry policy, history threading, and single/multi-sample
//! result shaping. Endpoint configuration is per-instance state, so
//! clients pointed at different endpoints can run concurrently from
//! independent tasks.

use reqwest::Client as HttpClient;
use uuid::Uuid;

use super::config::{EndpointConfig, RetryConfig};
use super::errors::ClientError;
use super::history::History;
use super::models::resolve_model;
use super::transcript::TranscriptSink;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, Message};

// ─── Constants ───────────────────────────────────────────────────────────────

/// Sampling temperature when the caller does not pass one.
pub const DEFAULT_TEMPERATURE: f32 = 0.75;

/// Default ceiling on generated tokens per completion.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

// ─── Completion ──────────────────────────────────────────────────────────────

/// One completed sample: the assistant's text and the input history
/// extended with the user and assistant turns, in that order.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub history: History,
}

// ─── CompletionClient ────────────────────────────────────────────────────────

/// Client for one resolved model on one endpoint.
///
/// Stateless across calls: it holds configuration and a connection pool,
/// never conversation state. Histories are owned by the caller.
#[derive(Debug)]
pub struct CompletionClient {
    http: HttpClient,
    endpoint: EndpointConfig,
    retry: RetryConfig,
    model: &'static str,
    max_tokens: u32,
    transcript: Option<TranscriptSink>,
}

impl CompletionClient {
    /// Create a client for `model`, resolving the endpoint from the
    /// environment (`OLLAMA_BASE_URL`, default `http://localhost:11434`).
    ///
    /// The allow-list check runs first: an unknown identifier fails with
    /// [`ClientError::UnsupportedModel`] before any transport is built or
    /// network touched.
    pub fn new(model: &str) -> Result<Self, ClientError> {
        Self::with_config(model, EndpointConfig::from_env(), RetryConfig::default())
    }

    /// Create a client with explicit endpoint and retry configuration.
    pub fn with_config(
        model: &str,
        endpoint: EndpointConfig,
        retry: RetryConfig,
    ) -> Result<Self, ClientError> {
        let model = resolve_model(model)?;

        let http = HttpClient::builder()
            .connect_timeout(retry.connect_timeout)
            .timeout(retry.request_timeout)
            .build()
            .map_err(|e| ClientError::Connection {
                endpoint: endpoint.base_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        tracing::info!(model, base_url = %endpoint.base_url, "completion client ready");

        Ok(Self {
            http,
            endpoint,
            retry,
            model,
            max_tokens: DEFAULT_MAX_TOKENS,
            transcript: None,
        })
    }

    /// The resolved model identifier this client invokes.
    pub fn model(&self) -> &'static str {
        self.model
    }

    /// Override the generated-length ceiling.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Enable the role-tagged exchange transcript.
    pub fn with_transcript(mut self, sink: TranscriptSink) -> Self {
        self.transcript = Some(sink);
        self
    }

    // ─── Chat Completion ─────────────────────────────────────────────────

    /// Request a single completion for `message` against `history`.
    ///
    /// The outbound message list is `[system] + history + [user]`. Returns
    /// the assistant text plus the input history extended with the user
    /// message then the assistant message. `history` is never modified;
    /// `None` means empty. `temperature` defaults to 0.75 and is passed
    /// through unvalidated.
    pub async fn complete(
        &self,
        message: &str,
        system_message: &str,
        history: Option<&History>,
        temperature: Option<f32>,
    ) -> Result<Completion, ClientError> {
        let samples = self
            .request_samples(message, system_message, history, temperature, 1)
            .await?;
        samples
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::MalformedResponse {
                reason: "response carried no choices".into(),
            })
    }

    /// Request `sample_count` independent completions for the same prefix
    /// in one round-trip.
    ///
    /// Returns exactly `sample_count` completions in response order. Each
    /// history is the shared prefix plus that sample's assistant turn;
    /// extending one never affects another or the input history.
    pub async fn complete_batch(
        &self,
        message: &str,
        system_message: &str,
        history: Option<&History>,
        temperature: Option<f32>,
        sample_count: u32,
    ) -> Result<Vec<Completion>, ClientError> {
        if sample_count == 0 {
            return Err(ClientError::InvalidRequest {
                reason: "sample_count must be at least 1".into(),
            });
        }
        self.request_samples(message, system_message, history, temperature, sample_count)
            .await
    }

    async fn request_samples(
        &self,
        message: &str,
        system_message: &str,
        history: Option<&History>,
        temperature: Option<f32>,
        n: u32,
    ) -> Result<Vec<Completion>, ClientError> {
        let empty = History::new();
        let prefix = history.unwrap_or(&empty).push(Message::user(message));

        let mut messages = Vec::with_capacity(prefix.len() + 1);
        messages.push(Message::system(system_message));
        messages.extend(prefix.to_messages());

        let body = ChatCompletionRequest {
            model: self.model.to_string(),
            messages,
            temperature: temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens,
            n,
        };

        let request_id = Uuid::new_v4();
        tracing::info!(
            %request_id,
            model = self.model,
            message_count = body.messages.len(),
            n,
            max_tokens = self.max_tokens,
            "chat completion request"
        );

        let texts = self.send_with_retry(&body, n, request_id).await?;

        if let Some(sink) = &self.transcript {
            sink.record(&body.messages, &texts);
        }

        Ok(texts
            .into_iter()
            .map(|text| {
                let history = prefix.push(Message::assistant(text.clone()));
                Completion { text, history }
            })
            .collect())
    }

    // ─── Retry Loop ──────────────────────────────────────────────────────

    /// Run one request through the bounded exponential-backoff loop.
    ///
    /// Retryable failures are absorbed until the attempt budget runs out;
    /// the exhaustion error wraps the last cause. Fatal failures surface
    /// immediately.
    async fn send_with_retry(
        &self,
        body: &ChatCompletionRequest,
        n: u32,
        request_id: Uuid,
    ) -> Result<Vec<String>, ClientError> {
        let attempts = self.retry.max_attempts.max(1);
        let mut last_error: Option<ClientError> = None;

        for attempt in 1..=attempts {
            let delay = self.retry.backoff_delay(attempt);
            if !delay.is_zero() {
                tracing::warn!(
                    %request_id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }

            match self.attempt(body, n).await {
                Ok(texts) => {
                    if attempt > 1 {
                        tracing::info!(%request_id, attempt, "request succeeded after retry");
                    }
                    return Ok(texts);
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(%request_id, attempt, error = %e, "transient failure");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(ClientError::RetriesExhausted {
            attempts,
            source: Box::new(last_error.unwrap_or(ClientError::MalformedResponse {
                reason: "retry loop recorded no attempt".into(),
            })),
        })
    }

    /// One request attempt: send, check status, decode, shape-check.
    async fn attempt(
        &self,
        body: &ChatCompletionRequest,
        n: u32,
    ) -> Result<Vec<String>, ClientError> {
        let url = self.endpoint.completions_url();

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.endpoint.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout {
                        duration_secs: self.retry.request_timeout.as_secs(),
                    }
                } else {
                    ClientError::Connection {
                        endpoint: url.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Connection {
                endpoint: url.clone(),
                reason: format!("failed to read response body: {e}"),
            })?;

        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| ClientError::MalformedResponse {
                reason: format!("invalid response JSON: {e}"),
            })?;

        if parsed.choices.len() != n as usize {
            return Err(ClientError::MalformedResponse {
                reason: format!("expected {n} choices, got {}", parsed.choices.len()),
            });
        }

        Ok(parsed
            .choices
            .into_iter()
            .map(|c| c.message.content.unwrap_or_default())
            .collect())
    }

    // ─── Health Check ────────────────────────────────────────────────────

    /// Check whether the endpoint is reachable.
    ///
    /// Probes the model listing route; never consumes inference tokens.
    pub async fn health_check(&self) -> Result<bool, ClientError> {
        let url = self.endpoint.models_url();
        match self
            .http
            .get(&url)
            .bearer_auth(&self.endpoint.api_key)
            .send()
            .await
        {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
