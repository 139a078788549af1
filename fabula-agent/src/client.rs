//! Retrying model client.
//!
//! [`ModelClient`] is the one object the pipeline holds for model access. It
//! is constructed once with an explicit backend (or as the disabled variant)
//! and passed into the extractor and verifier; there is no ambient provider
//! state anywhere in the workspace.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::traits::{GenerationRequest, LlmBackend, LlmError};
use crate::parse::parse_structured_response;

/// Retry and deadline policy for model calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempt cap for transient failures (rate limit, timeout, network)
    pub max_attempts: u32,
    /// Attempt cap for malformed output (unparsable or empty)
    pub malformed_attempts: u32,
    /// Backoff base; the wait is `base_delay_ms * 3^attempt`
    pub base_delay_ms: u64,
    /// Per-call deadline
    pub request_timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            malformed_attempts: 2,
            base_delay_ms: 500,
            request_timeout_ms: 45_000,
        }
    }
}

impl RetryPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms * 3u64.pow(attempt))
    }
}

/// A language-model client with timeout, bounded retries and backoff.
///
/// The disabled variant carries no backend and fails every call with
/// [`LlmError::Unavailable`]; callers then take their heuristic path, which
/// is how fallback-only runs are configured.
#[derive(Clone)]
pub struct ModelClient {
    backend: Option<Arc<dyn LlmBackend>>,
    policy: RetryPolicy,
}

impl ModelClient {
    /// Client over a concrete backend with the default policy.
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self {
            backend: Some(backend),
            policy: RetryPolicy::default(),
        }
    }

    /// Client with no backend; every call reports unavailable.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether a backend is configured.
    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Generate text, retrying transient failures with exponential backoff.
    pub async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| LlmError::Unavailable("model client is disabled".to_string()))?;

        let mut attempt = 0u32;
        loop {
            let call = backend.generate(request.clone());
            let deadline = Duration::from_millis(self.policy.request_timeout_ms);
            let result = match tokio::time::timeout(deadline, call).await {
                Ok(result) => result,
                Err(_) => Err(LlmError::Timeout(self.policy.request_timeout_ms)),
            };

            match result {
                Ok(response) => {
                    let content = response.content.trim().to_string();
                    if content.is_empty() {
                        return Err(LlmError::EmptyResponse);
                    }
                    debug!(
                        backend = backend.id(),
                        tokens = response.usage.total(),
                        "generation complete"
                    );
                    return Ok(content);
                }
                Err(error) if error.is_retryable() && attempt + 1 < self.policy.max_attempts => {
                    let wait = self.policy.backoff(attempt);
                    warn!(
                        backend = backend.id(),
                        attempt = attempt + 1,
                        wait_ms = wait.as_millis() as u64,
                        %error,
                        "transient model failure, backing off"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Generate and extract structured JSON, re-asking on malformed output.
    pub async fn generate_structured(
        &self,
        request: GenerationRequest,
    ) -> Result<Value, LlmError> {
        let mut last_error = LlmError::EmptyResponse;

        for _ in 0..self.policy.malformed_attempts.max(1) {
            let text = self.generate(request.clone()).await?;
            match parse_structured_response(&text) {
                Ok(value) => return Ok(value),
                Err(error) => {
                    warn!(%error, "malformed structured response, re-asking");
                    last_error = error;
                }
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            malformed_attempts: 2,
            base_delay_ms: 1,
            request_timeout_ms: 1_000,
        }
    }

    #[tokio::test]
    async fn disabled_client_reports_unavailable() {
        let client = ModelClient::disabled();
        let err = client
            .generate(GenerationRequest::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Unavailable(_)));
    }

    #[tokio::test]
    async fn transient_errors_are_retried_then_succeed() {
        let backend = Arc::new(
            MockBackend::default()
                .push_error(LlmError::RateLimited {
                    retry_after_ms: None,
                })
                .push_error(LlmError::NetworkError("reset".into()))
                .push_response("recovered"),
        );
        let client = ModelClient::new(backend.clone()).with_policy(fast_policy());

        let content = client.generate(GenerationRequest::new("x")).await.unwrap();
        assert_eq!(content, "recovered");
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn retries_exhaust_to_the_last_error() {
        let backend = Arc::new(
            MockBackend::default()
                .push_error(LlmError::RateLimited {
                    retry_after_ms: None,
                })
                .push_error(LlmError::RateLimited {
                    retry_after_ms: None,
                })
                .push_error(LlmError::RateLimited {
                    retry_after_ms: None,
                }),
        );
        let client = ModelClient::new(backend).with_policy(fast_policy());

        let err = client
            .generate(GenerationRequest::new("x"))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn malformed_output_is_reasked_then_parsed() {
        let backend = Arc::new(
            MockBackend::default()
                .push_response("not json at all")
                .push_response(r#"{"ok": true}"#),
        );
        let client = ModelClient::new(backend.clone()).with_policy(fast_policy());

        let value = client
            .generate_structured(GenerationRequest::new("x"))
            .await
            .unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn persistent_malformed_output_fails_with_parse_error() {
        let backend = Arc::new(MockBackend::default().with_response("still not json"));
        let client = ModelClient::new(backend).with_policy(fast_policy());

        let err = client
            .generate_structured(GenerationRequest::new("x"))
            .await
            .unwrap_err();
        assert!(err.is_malformed());
    }
}
