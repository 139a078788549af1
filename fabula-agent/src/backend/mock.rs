//! Mock LLM backend for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::traits::*;

/// Scripted backend: returns queued responses in order, then a default.
///
/// Errors can be enqueued too, which is how retry and fallback paths are
/// exercised without a network.
pub struct MockBackend {
    model_id: String,
    available: AtomicBool,
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    default_response: String,
    call_count: AtomicU32,
}

impl MockBackend {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            available: AtomicBool::new(true),
            script: Mutex::new(VecDeque::new()),
            default_response: "{}".to_string(),
            call_count: AtomicU32::new(0),
        }
    }

    /// Set the response returned once the script is exhausted.
    pub fn with_response(mut self, content: impl Into<String>) -> Self {
        self.default_response = content.into();
        self
    }

    /// Queue a scripted response ahead of the default.
    pub fn push_response(self, content: impl Into<String>) -> Self {
        self.script
            .lock()
            .expect("mock script lock")
            .push_back(Ok(content.into()));
        self
    }

    /// Queue a scripted error ahead of the default.
    pub fn push_error(self, error: LlmError) -> Self {
        self.script
            .lock()
            .expect("mock script lock")
            .push_back(Err(error));
        self
    }

    /// Mark the backend unavailable.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Number of generate calls made so far.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("mock-model")
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if !self.available.load(Ordering::SeqCst) {
            return Err(LlmError::Unavailable("mock backend disabled".to_string()));
        }

        let scripted = self.script.lock().expect("mock script lock").pop_front();
        let content = match scripted {
            Some(Ok(content)) => content,
            Some(Err(error)) => return Err(error),
            None => self.default_response.clone(),
        };

        let prompt_tokens = (request.prompt.len() / 4) as u32;
        let completion_tokens = (content.len() / 4) as u32;

        Ok(GenerationResponse {
            content,
            usage: Usage {
                prompt_tokens,
                completion_tokens,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_responses_come_first() {
        let backend = MockBackend::default()
            .push_response("first")
            .with_response("later");

        let a = backend.generate(GenerationRequest::new("x")).await.unwrap();
        let b = backend.generate(GenerationRequest::new("x")).await.unwrap();

        assert_eq!(a.content, "first");
        assert_eq!(b.content, "later");
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn scripted_errors_are_returned() {
        let backend = MockBackend::default().push_error(LlmError::RateLimited {
            retry_after_ms: None,
        });

        let err = backend
            .generate(GenerationRequest::new("x"))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
