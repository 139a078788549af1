//! Core traits for LLM backends.
//!
//! [`LlmBackend`] is the single abstraction over inference providers. The
//! verification pipeline never talks to a provider directly; it goes through
//! a [`crate::client::ModelClient`], which layers timeouts and retries on
//! top of this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error types for LLM operations.
///
/// The retryable/fatal split drives the degrade policy: transient errors are
/// retried with backoff, malformed output gets a small retry budget, and
/// both eventually hand the caller over to its heuristic fallback.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Backend is not configured or not reachable at all
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Request was rejected by the provider
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Rate limited by the provider
    #[error("Rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    /// The call exceeded its deadline
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// Transport-level failure
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The provider returned no usable text
    #[error("Empty response from backend")]
    EmptyResponse,

    /// The response could not be parsed as the expected structure
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl LlmError {
    /// Whether waiting and retrying the same call can plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited { .. }
                | LlmError::Timeout(_)
                | LlmError::NetworkError(_)
                | LlmError::RequestFailed(_)
        )
    }

    /// Whether the failure is malformed output rather than a service fault.
    pub fn is_malformed(&self) -> bool {
        matches!(self, LlmError::ParseError(_) | LlmError::EmptyResponse)
    }
}

/// A single generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// System prompt (optional)
    pub system: Option<String>,
    /// User prompt
    pub prompt: String,
    /// Sampling temperature; verification prompts run near-deterministic
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_output_tokens: Option<u32>,
    /// Ask the provider for JSON-mode output where supported
    pub json_output: bool,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            temperature: 0.1,
            max_output_tokens: None,
            json_output: false,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    /// Request JSON output.
    pub fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }
}

/// Token usage reported by a backend.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl Usage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Response from a generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated text
    pub content: String,
    /// Token usage, zeroed when the provider omits it
    pub usage: Usage,
}

/// Core trait for LLM backends.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Backend identifier (model name).
    fn id(&self) -> &str;

    /// Check whether the backend is currently reachable.
    async fn is_available(&self) -> bool;

    /// Generate a completion.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError>;
}
