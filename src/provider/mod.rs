//! # Model Provider Module
//!
//! The primary optimization strategy is a single remote generation call. This
//! module defines the seam for that call ([`ModelProvider`]) and the HTTP
//! implementation that speaks the Bedrock runtime `invoke` shape.
//!
//! A provider reports failure through [`ProviderError`]; the optimization
//! pipeline treats every variant the same way and falls back to the
//! rule-based strategy.

pub mod family;
pub mod http;

pub use family::ModelFamily;
pub use http::{HttpProvider, HttpProviderConfig};

use async_trait::async_trait;
use serde_json::Value;

/// Everything the remote model needs for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Provider model id, e.g. `anthropic.claude-3-haiku-20240307-v1:0`.
    pub model_id: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    /// Raw usage block if the provider returned one.
    pub usage: Option<Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Provider returned an empty completion")]
    EmptyResponse,

    #[error("No credentials configured for provider '{0}'")]
    MissingCredentials(String),
}

impl ProviderError {
    /// Short machine-friendly label used in logs and analytics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Transport(e) if e.is_timeout() => "timeout",
            ProviderError::Transport(_) => "transport",
            ProviderError::Status { .. } => "status",
            ProviderError::UnsupportedModel(_) => "unsupported_model",
            ProviderError::MalformedResponse(_) => "malformed_response",
            ProviderError::EmptyResponse => "empty_response",
            ProviderError::MissingCredentials(_) => "missing_credentials",
        }
    }
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, ProviderError>;

    fn name(&self) -> &'static str;
}

/// Provider that is never available. Useful when no credentials exist: every
/// request goes straight to the fallback strategy.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineProvider;

#[async_trait]
impl ModelProvider for OfflineProvider {
    async fn generate(&self, _: &GenerationRequest) -> Result<Generation, ProviderError> {
        Err(ProviderError::MissingCredentials("offline".into()))
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}
