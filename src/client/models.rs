//! Supported model identifiers.
//!
//! The allow-list is fixed at compile time and checked before any network
//! activity. Identifiers are opaque backend model names.

use super::errors::ClientError;

/// Model identifiers the client will invoke.
pub const SUPPORTED_MODELS: &[&str] = &[
    "qwen3-coder:30b",
    "qwen3-next:latest",
    "qwen3-vl:235b",
];

/// Alias for callers that enumerate models generically.
pub const AVAILABLE_MODELS: &[&str] = SUPPORTED_MODELS;

/// Validate `model` against the allow-list, returning the canonical entry.
pub fn resolve_model(model: &str) -> Result<&'static str, ClientError> {
    SUPPORTED_MODELS
        .iter()
        .find(|m| **m == model)
        .copied()
        .ok_or_else(|| ClientError::UnsupportedModel {
            model: model.to_string(),
            available: SUPPORTED_MODELS,
        })
}
