//! Veracity - claim-based backstory verification.
//!
//! Checks whether a character backstory is consistent with the contents of
//! a specific novel. A backstory is decomposed into atomic claims, each
//! claim is checked against evidence retrieved from an indexed novel, and
//! the per-claim judgments are aggregated into one binary verdict with a
//! confidence and rationale.
//!
//! # Architecture
//!
//! ```text
//! backstory ──> ClaimExtractor ──> claims (enriched with vocabulary)
//!                                     │
//!     novel ──> chronicle::NovelIndex │  per claim
//!                         │           ▼
//!                         └──> EvidenceRetriever ──> evidence set
//!                                                        │
//!                              ClaimVerifier <───────────┘
//!                                     │ verifications
//!                                     ▼
//!                              aggregate() ──> AggregateVerdict
//! ```
//!
//! Model-based stages (extraction, verification) are optional; every one of
//! them degrades to a deterministic heuristic when the model path is
//! disabled or fails, so a run without credentials still completes.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod extract;
pub mod lexicon;
pub mod pipeline;
pub mod retrieve;
pub mod types;
pub mod verify;

pub use aggregate::aggregate;
pub use cache::{cache_key, CacheStore, MemoryStore};
pub use config::{
    AggregationConfig, ExtractionConfig, ExtractionMode, RetrievalConfig, VeracityConfig,
    VerificationConfig,
};
pub use extract::{ClaimExtractor, ClaimSource, ModelExtractor, PatternExtractor};
pub use pipeline::StoryPipeline;
pub use retrieve::EvidenceRetriever;
pub use types::{
    AggregateVerdict, Claim, ClaimType, EvidenceItem, EvidenceKind, Importance, Judgment,
    PredictionRecord, Result, StoryRecord, VeracityError, Verification,
};
pub use verify::ClaimVerifier;
