//! Fabula Agent - language model orchestration.
//!
//! Provides the model-facing half of the verification pipeline:
//! - a trait-based backend abstraction ([`LlmBackend`]) with an
//!   OpenAI-compatible HTTP implementation and a scripted mock
//! - [`ModelClient`], the constructor-injected client that layers per-call
//!   timeouts, bounded retries and exponential backoff over a backend
//! - the shared tolerant JSON extractor used for every structured response
//!
//! Heuristic fallbacks live with their callers; this crate only reports
//! failures precisely enough (retryable vs. malformed vs. unavailable) for
//! callers to degrade gracefully.

pub mod backend;
pub mod client;
pub mod parse;

pub use backend::{
    GenerationRequest, GenerationResponse, LlmBackend, LlmError, MockBackend, OpenAiBackend, Usage,
};
pub use client::{ModelClient, RetryPolicy};
pub use parse::parse_structured_response;
