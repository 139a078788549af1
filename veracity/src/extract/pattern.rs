//! Pattern-based claim extraction.
//!
//! The non-model path: segments the backstory into sentences and classifies
//! each against the trait, emotion, life-event and relationship lexicons.
//! Sentences matching nothing but a generic state/action verb still become
//! claims, and an empty result degrades to a single whole-backstory claim,
//! so the pipeline never runs on an empty claim set.

use async_trait::async_trait;

use crate::config::ExtractionConfig;
use crate::extract::ClaimSource;
use crate::lexicon::{
    contains_word, temporal_phrases, ACTION_VERBS, EMOTIONS, EVENTS, FEAR_EMOTIONS,
    NEGATIVE_TRAITS, POSITIVE_TRAITS, RELATIONSHIPS, SENTENCE_SPLIT_RE,
};
use crate::types::{Claim, ClaimType, Importance, Result};

/// Lexicon-driven claim source.
#[derive(Debug, Clone, Default)]
pub struct PatternExtractor {
    config: ExtractionConfig,
}

impl PatternExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract raw claims from backstory prose (no vocabulary yet).
    pub fn extract_claims(&self, backstory: &str, character: &str) -> Vec<Claim> {
        let mut claims = Vec::new();

        for sentence in SENTENCE_SPLIT_RE.split(backstory) {
            let sentence = sentence.trim();
            if sentence.len() < self.config.min_sentence_chars {
                continue;
            }
            let lower = sentence.to_lowercase();

            if let Some(claim) = trait_claim(sentence, &lower, character) {
                claims.push(claim);
                continue;
            }
            if let Some(claim) = event_claim(sentence, &lower, character) {
                claims.push(claim);
                continue;
            }
            if let Some(claim) = relationship_claim(sentence, &lower, character) {
                claims.push(claim);
                continue;
            }

            // Generic fabrication-catcher: any stateful sentence is a claim.
            if ACTION_VERBS.iter().any(|verb| contains_word(&lower, verb)) {
                claims.push(
                    Claim::new(
                        format!("action_{}", claims.len()),
                        format_claim(sentence, character),
                        ClaimType::Event,
                        Importance::Medium,
                    )
                    .with_sub_kind("action"),
                );
            }
        }

        if claims.is_empty() && backstory.trim().len() > 20 {
            let summary: String = backstory
                .trim()
                .chars()
                .take(self.config.summary_claim_chars)
                .collect();
            claims.push(
                Claim::new(
                    "backstory_summary",
                    summary,
                    ClaimType::Event,
                    Importance::Medium,
                )
                .with_sub_kind("general"),
            );
        }

        dedup_by_text(claims)
    }
}

#[async_trait]
impl ClaimSource for PatternExtractor {
    async fn claims(&self, backstory: &str, character: &str) -> Result<Vec<Claim>> {
        Ok(self.extract_claims(backstory, character))
    }
}

fn trait_claim(sentence: &str, lower: &str, character: &str) -> Option<Claim> {
    for trait_word in POSITIVE_TRAITS.iter().chain(NEGATIVE_TRAITS) {
        if contains_word(lower, trait_word) {
            return Some(
                Claim::new(
                    format!("trait_{trait_word}"),
                    format_claim(sentence, character),
                    ClaimType::Trait,
                    Importance::High,
                )
                .with_sub_kind(*trait_word),
            );
        }
    }

    for emotion in EMOTIONS {
        if contains_word(lower, emotion) {
            let kind = if FEAR_EMOTIONS.contains(emotion) {
                ClaimType::Fear
            } else {
                ClaimType::Trait
            };
            return Some(
                Claim::new(
                    format!("emotion_{emotion}"),
                    format_claim(sentence, character),
                    kind,
                    Importance::High,
                )
                .with_sub_kind(*emotion),
            );
        }
    }

    None
}

fn event_claim(sentence: &str, lower: &str, character: &str) -> Option<Claim> {
    for (sub_kind, keywords) in EVENTS {
        for keyword in keywords.iter() {
            if contains_word(lower, keyword) {
                let mut claim = Claim::new(
                    format!("event_{sub_kind}"),
                    format_claim(sentence, character),
                    ClaimType::Event,
                    Importance::High,
                )
                .with_sub_kind(*sub_kind);
                claim.temporal = temporal_phrases(sentence);
                return Some(claim);
            }
        }
    }
    None
}

fn relationship_claim(sentence: &str, lower: &str, character: &str) -> Option<Claim> {
    for relation in RELATIONSHIPS {
        if contains_word(lower, relation) {
            return Some(
                Claim::new(
                    format!("relationship_{relation}"),
                    format_claim(sentence, character),
                    ClaimType::Relationship,
                    Importance::Medium,
                )
                .with_sub_kind(*relation),
            );
        }
    }
    None
}

/// Ensure the claim sentence names the character.
fn format_claim(sentence: &str, character: &str) -> String {
    let lower = sentence.to_lowercase();
    if lower.contains(&character.to_lowercase()) {
        return sentence.to_string();
    }

    let pronoun_led = ["he ", "she ", "they ", "his ", "her ", "their "]
        .iter()
        .any(|p| lower.starts_with(p));
    if pronoun_led {
        format!("{character}'s {sentence}")
    } else {
        format!("{character} {sentence}")
    }
}

fn dedup_by_text(claims: Vec<Claim>) -> Vec<Claim> {
    let mut seen = std::collections::HashSet::new();
    claims
        .into_iter()
        .filter(|claim| seen.insert(claim.text.trim().to_lowercase()))
        .collect()
}
