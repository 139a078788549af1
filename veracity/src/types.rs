//! Core types for the verification pipeline.

use chronicle::SceneType;
use serde::{Deserialize, Serialize};

/// Category of an extracted claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    Trait,
    Event,
    Fear,
    Motivation,
    Relationship,
    Skill,
    Belief,
}

impl ClaimType {
    /// Tolerant mapping from a model-supplied label; unknown labels become
    /// events, the broadest category.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "trait" => ClaimType::Trait,
            "fear" => ClaimType::Fear,
            "motivation" => ClaimType::Motivation,
            "relationship" => ClaimType::Relationship,
            "skill" => ClaimType::Skill,
            "belief" => ClaimType::Belief,
            _ => ClaimType::Event,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClaimType::Trait => "trait",
            ClaimType::Event => "event",
            ClaimType::Fear => "fear",
            ClaimType::Motivation => "motivation",
            ClaimType::Relationship => "relationship",
            ClaimType::Skill => "skill",
            ClaimType::Belief => "belief",
        }
    }
}

/// Importance tag assigned at extraction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    High,
    Medium,
    Low,
}

impl Importance {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "high" => Importance::High,
            "low" => Importance::Low,
            _ => Importance::Medium,
        }
    }
}

/// An atomic, falsifiable assertion extracted from a backstory.
///
/// Claims are produced by the extractor, enriched with search vocabulary,
/// and read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Identifier, descriptive where the source allows (`trait_brave`)
    pub id: String,
    /// Full claim sentence, always naming the character
    pub text: String,
    /// Claim category
    pub kind: ClaimType,
    /// Importance tag
    pub importance: Importance,
    /// Detected sub-type: an event kind (`death`), a trait word (`brave`),
    /// or a generic marker (`action`, `general`)
    pub sub_kind: Option<String>,
    /// Terms expected in the novel if the claim is true; order-significant
    pub vocabulary: Vec<String>,
    /// Terms expected if the claim is false
    pub anti_vocabulary: Vec<String>,
    /// Syntactic patterns for trait/event/fear claims
    pub patterns: Vec<String>,
    /// Temporal phrases found in the claim sentence
    pub temporal: Vec<String>,
    /// Extraction certainty in [0,1] (not verification certainty)
    pub confidence: f32,
}

impl Claim {
    /// A bare claim before vocabulary enrichment.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        kind: ClaimType,
        importance: Importance,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind,
            importance,
            sub_kind: None,
            vocabulary: Vec::new(),
            anti_vocabulary: Vec::new(),
            patterns: Vec::new(),
            temporal: Vec::new(),
            confidence: 0.5,
        }
    }

    pub fn with_sub_kind(mut self, sub_kind: impl Into<String>) -> Self {
        self.sub_kind = Some(sub_kind.into());
        self
    }
}

/// How a piece of evidence bears on its claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    Supporting,
    Contradicting,
    Neutral,
}

/// A scored (claim, chunk) pairing. Transient; lives only for one
/// verification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Source chunk identifier
    pub chunk_id: String,
    /// Truncated chunk text for prompts and rationales
    pub excerpt: String,
    /// Relevance strength; always positive for retained items
    pub score: f32,
    /// Scene-weighted score used for ranking
    pub weight: f32,
    /// Supporting / contradicting / neutral classification
    pub kind: EvidenceKind,
    /// Scene type of the source chunk
    pub scene: SceneType,
    /// Vocabulary terms that matched (anti terms prefixed)
    pub matched_terms: Vec<String>,
}

/// Judgment for a single claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Judgment {
    Consistent,
    Contradicted,
    Uncertain,
}

/// The verdict on one claim against its evidence set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    pub judgment: Judgment,
    /// Confidence in [0,1]
    pub confidence: f32,
    pub rationale: String,
    /// Key evidence excerpts behind the judgment
    pub key_passages: Vec<String>,
    /// Whether a model (rather than the scoring heuristic) judged the claim
    pub model_assisted: bool,
}

/// Final per-backstory output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateVerdict {
    /// 1 = consistent, 0 = inconsistent
    pub prediction: u8,
    /// Confidence in [0,1]
    pub confidence: f32,
    /// Which claims drove the decision
    pub rationale: String,
}

impl AggregateVerdict {
    /// The conservative default used when a story cannot be processed.
    pub fn conservative_default(reason: impl Into<String>) -> Self {
        Self {
            prediction: 0,
            confidence: 0.5,
            rationale: reason.into(),
        }
    }
}

/// One backstory to check, as read from the external tabular source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryRecord {
    pub id: i64,
    pub book_name: String,
    pub character: String,
    /// The backstory text
    pub content: String,
    /// Ground-truth label; absent for unlabeled inputs
    #[serde(default)]
    pub label: Option<u8>,
}

/// One prediction row for the external tabular sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: i64,
    pub label: u8,
}

/// Error types for the verification pipeline.
#[derive(Debug, thiserror::Error)]
pub enum VeracityError {
    /// Extraction produced no claims even after fallback
    #[error("No claims extracted from backstory")]
    NoClaims,

    /// Novel loading or indexing failed
    #[error(transparent)]
    Chronicle(#[from] chronicle::ChronicleError),

    /// Model call failed without a usable fallback
    #[error(transparent)]
    Model(#[from] fabula_agent::LlmError),

    /// Invalid pipeline configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, VeracityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_type_labels_round_trip() {
        for kind in [
            ClaimType::Trait,
            ClaimType::Event,
            ClaimType::Fear,
            ClaimType::Motivation,
            ClaimType::Relationship,
            ClaimType::Skill,
            ClaimType::Belief,
        ] {
            assert_eq!(ClaimType::from_label(kind.label()), kind);
        }
    }

    #[test]
    fn unknown_labels_default_sensibly() {
        assert_eq!(ClaimType::from_label("saga"), ClaimType::Event);
        assert_eq!(Importance::from_label("middling"), Importance::Medium);
    }

    #[test]
    fn conservative_default_shape() {
        let verdict = AggregateVerdict::conservative_default("novel not found");
        assert_eq!(verdict.prediction, 0);
        assert_eq!(verdict.confidence, 0.5);
    }
}
