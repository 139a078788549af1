//! Configuration for the verification pipeline.
//!
//! Every empirically tuned threshold lives here as a named, overridable
//! field so the pipeline can be retuned against a labeled validation set
//! without touching component code.

use chronicle::IndexConfig;
use serde::{Deserialize, Serialize};

use crate::types::ClaimType;

/// Which claim source runs first for each backstory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Model-based extraction, pattern fallback on per-story failure
    Model,
    /// Pattern-based extraction only
    Pattern,
}

/// Top-level configuration for a verification run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VeracityConfig {
    /// Novel chunking and annotation settings
    pub index: IndexConfig,
    /// Claim extraction settings
    pub extraction: ExtractionConfig,
    /// Evidence retrieval settings
    pub retrieval: RetrievalConfig,
    /// Per-claim verification settings
    pub verification: VerificationConfig,
    /// Verdict aggregation settings
    pub aggregation: AggregationConfig,
}

impl VeracityConfig {
    /// Load configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Claim extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Claim source tried first
    pub mode: ExtractionMode,
    /// Degrade to the pattern path when the model path fails mid-story
    pub fallback_on_error: bool,
    /// Hard cap on claims per backstory
    pub max_claims: usize,
    /// Sentences shorter than this are not claim-worthy
    pub min_sentence_chars: usize,
    /// Length of the whole-backstory fallback claim
    pub summary_claim_chars: usize,
    /// Claims containing these substrings are too vague to check
    pub vague_adjectives: Vec<String>,
    /// Extraction confidence by importance tag
    pub confidence_high: f32,
    pub confidence_medium: f32,
    pub confidence_low: f32,
    /// Confidence floor when a curated lexicon matched the claim
    pub lexicon_match_confidence: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Pattern,
            fallback_on_error: true,
            max_claims: 12,
            min_sentence_chars: 12,
            summary_claim_chars: 200,
            vague_adjectives: ["complex", "interesting", "strange", "mysterious", "enigmatic"]
                .into_iter()
                .map(String::from)
                .collect(),
            confidence_high: 0.8,
            confidence_medium: 0.6,
            confidence_low: 0.4,
            lexicon_match_confidence: 0.8,
        }
    }
}

/// Evidence retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Evidence items kept per claim after ranking
    pub top_k: usize,
    /// Score for character presence in a chunk
    pub base_score: f32,
    /// Increment per positive-vocabulary term found
    pub term_bonus: f32,
    /// Penalty per anti-vocabulary term; contradictions are rarer and more
    /// informative, so this sits near twice the term bonus
    pub anti_penalty: f32,
    /// Bonus when the chunk carries quoted dialogue
    pub dialogue_bonus: f32,
    /// Bonus when every word of a syntactic pattern appears in the chunk
    pub pattern_bonus: f32,
    /// Chunks matching fewer distinct terms than this are weak evidence
    pub min_distinct_terms: usize,
    /// Near-zero score given to weak evidence instead of discarding it
    pub weak_evidence_score: f32,
    /// Evidence excerpt length in chars
    pub excerpt_chars: usize,
    /// Scene-type ranking multipliers; action outranks dialogue outranks
    /// introspection
    pub scene_weight_action: f32,
    pub scene_weight_dialogue: f32,
    pub scene_weight_introspection: f32,
    /// Run the expected-but-missing contradiction pass
    pub detect_critical_moments: bool,
    /// Weight assigned to a critical-moment contradiction
    pub critical_moment_weight: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            base_score: 1.0,
            term_bonus: 1.0,
            anti_penalty: 2.0,
            dialogue_bonus: 0.25,
            pattern_bonus: 1.5,
            min_distinct_terms: 2,
            weak_evidence_score: 0.5,
            excerpt_chars: 500,
            scene_weight_action: 1.2,
            scene_weight_dialogue: 1.0,
            scene_weight_introspection: 0.85,
            detect_critical_moments: true,
            critical_moment_weight: 2.5,
        }
    }
}

/// Per-claim verification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Excerpts of each class included in the judge prompt
    pub max_excerpts: usize,
    /// Weighting factor applied to contradiction scores in the net score;
    /// materially above 1 so contradictions cost more than support gains
    pub contradiction_weight: f32,
    /// Symmetric net-score decision threshold
    pub net_score_threshold: f32,
    /// Contradicting-passage count that triggers the count override
    pub contradiction_count_override: usize,
    /// Fraction of the supporting score the contradiction score must exceed
    /// for the count override to fire
    pub contradiction_fraction: f32,
    /// No-evidence default confidence for soft (unverifiable) claims
    pub soft_default_confidence: f32,
    /// No-evidence default confidence for specific claims
    pub specific_default_confidence: f32,
    /// Confidence for the mixed-weak-signal default
    pub mixed_default_confidence: f32,
    /// Per-passage confidence step when one evidence class is unopposed
    pub evidence_confidence_step: f32,
    /// Upper bound on heuristic confidence
    pub confidence_cap: f32,
    /// Confidence assigned when a judgment is salvaged from plain prose
    pub salvage_confidence: f32,
    /// Claim kinds whose unverifiable claims default to consistent
    pub soft_claim_kinds: Vec<ClaimType>,
    /// Event sub-kinds treated as soft (generic life events)
    pub soft_event_sub_kinds: Vec<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            max_excerpts: 3,
            contradiction_weight: 1.5,
            net_score_threshold: 2.0,
            contradiction_count_override: 3,
            contradiction_fraction: 0.5,
            soft_default_confidence: 0.5,
            specific_default_confidence: 0.6,
            mixed_default_confidence: 0.55,
            evidence_confidence_step: 0.1,
            confidence_cap: 0.95,
            salvage_confidence: 0.7,
            soft_claim_kinds: vec![
                ClaimType::Relationship,
                ClaimType::Motivation,
                ClaimType::Belief,
            ],
            soft_event_sub_kinds: ["general", "education", "backstory_summary"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Verdict aggregation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Confidence above which a contradiction counts as strong
    pub strong_contradiction_threshold: f32,
    /// Strong contradictions needed for the multi-contradiction override
    pub min_strong_contradictions: usize,
    /// Confidence a lone contradiction needs to override everything else
    pub single_contradiction_threshold: f32,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            strong_contradiction_threshold: 0.85,
            min_strong_contradictions: 2,
            single_contradiction_threshold: 0.9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_in_range() {
        let config = VeracityConfig::default();
        assert!(config.retrieval.anti_penalty >= 2.0 * config.retrieval.term_bonus - f32::EPSILON);
        assert!(config.verification.contradiction_weight > 1.0);
        assert!(config.aggregation.single_contradiction_threshold
            > config.aggregation.strong_contradiction_threshold);
        assert!(config.retrieval.scene_weight_action > config.retrieval.scene_weight_dialogue);
        assert!(config.retrieval.scene_weight_dialogue > config.retrieval.scene_weight_introspection);
    }

    #[test]
    fn yaml_round_trip() {
        let config = VeracityConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed = VeracityConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.extraction.max_claims, config.extraction.max_claims);
        assert_eq!(parsed.retrieval.top_k, config.retrieval.top_k);
        assert_eq!(parsed.extraction.mode, ExtractionMode::Pattern);
    }
}
