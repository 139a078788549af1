//! Vocabulary enrichment.
//!
//! Each retained claim gets a positive search vocabulary, an anti
//! vocabulary, and (for trait/event/fear claims) syntactic patterns, driven
//! by per-type lexicons keyed on keywords detected in the claim text.
//! Claim-specific words outrank generic lexicon terms in the vocabulary
//! ordering, which matters for coverage when the list is scanned in order.

use crate::config::ExtractionConfig;
use crate::lexicon::{
    temporal_phrases, trait_lexicon, EVENTS, SIGNIFICANT_WORD_RE, STOPWORDS, TRAIT_LEXICON_KEYS,
};
use crate::types::{Claim, ClaimType, Importance};

const MAX_VOCABULARY: usize = 15;
const MAX_ANTI_VOCABULARY: usize = 10;

/// Enrich a claim in place with search vocabulary and confidence.
pub fn enrich(claim: &mut Claim, character: &str, config: &ExtractionConfig) {
    let lower = claim.text.to_lowercase();

    // The character name is the retrieval gate, not evidence; its parts stay
    // out of the search vocabulary.
    let name_parts: Vec<String> = character
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let mut positive: Vec<String> = significant_words(&lower)
        .into_iter()
        .filter(|word| !name_parts.contains(word))
        .collect();
    let mut negative: Vec<String> = Vec::new();
    let mut lexicon_matched = false;

    match claim.kind {
        ClaimType::Trait | ClaimType::Fear => {
            if let Some((pos, neg)) = detected_trait_pair(claim, &lower) {
                extend_terms(&mut positive, pos.iter().copied());
                extend_terms(&mut negative, neg.iter().copied());
                lexicon_matched = true;
            } else {
                extend_terms(&mut positive, ["was", "is", "known for", "nature"]);
                extend_terms(&mut negative, ["not", "never", "opposite", "contrary"]);
            }
        }
        ClaimType::Event => {
            if let Some(keywords) = event_keywords(claim) {
                extend_terms(&mut positive, keywords.iter().take(3).copied());
                lexicon_matched = true;
            } else {
                extend_terms(&mut positive, ["happened", "occurred", "when", "after", "before"]);
            }
            extend_terms(
                &mut negative,
                ["never happened", "did not occur", "impossible"],
            );
        }
        ClaimType::Relationship => {
            if let Some(relation) = claim.sub_kind.clone() {
                extend_terms(
                    &mut positive,
                    [
                        relation.clone(),
                        format!("his {relation}"),
                        format!("her {relation}"),
                    ],
                );
                extend_terms(&mut negative, [format!("no {relation}")]);
            }
            extend_terms(&mut positive, ["met", "knew", "friend", "relation"]);
            extend_terms(&mut negative, ["stranger", "never met", "unknown"]);
        }
        ClaimType::Skill => {
            extend_terms(&mut positive, ["skilled", "expert", "learned", "trained", "able to"]);
            extend_terms(&mut negative, ["incapable", "unable", "never learned"]);
        }
        ClaimType::Motivation | ClaimType::Belief => {
            extend_terms(&mut positive, ["mentioned", "said", "described", "believed"]);
            extend_terms(&mut negative, ["denied", "contradicted", "opposite"]);
        }
    }

    positive.truncate(MAX_VOCABULARY);
    negative.truncate(MAX_ANTI_VOCABULARY);

    claim.vocabulary = positive;
    claim.anti_vocabulary = negative;

    if matches!(
        claim.kind,
        ClaimType::Trait | ClaimType::Event | ClaimType::Fear
    ) {
        claim.patterns = vec![
            format!("{character} was"),
            format!("{character} had"),
            format!("{character} never"),
        ];
    }

    if claim.temporal.is_empty() {
        claim.temporal = temporal_phrases(&claim.text);
    }

    let base = match claim.importance {
        Importance::High => config.confidence_high,
        Importance::Medium => config.confidence_medium,
        Importance::Low => config.confidence_low,
    };
    claim.confidence = if lexicon_matched {
        base.max(config.lexicon_match_confidence)
    } else {
        base
    };
}

/// Curated trait pair for the claim, keyed on its sub-kind or any lexicon
/// key found in the claim text. Containment rather than word matching, so
/// adverbial forms ("bravely") still trigger their pair.
fn detected_trait_pair(
    claim: &Claim,
    lower: &str,
) -> Option<(&'static [&'static str], &'static [&'static str])> {
    if let Some(sub_kind) = claim.sub_kind.as_deref() {
        if let Some(pair) = trait_lexicon(sub_kind) {
            return Some(pair);
        }
    }
    TRAIT_LEXICON_KEYS
        .iter()
        .find(|key| lower.contains(*key))
        .and_then(|key| trait_lexicon(key))
}

fn event_keywords(claim: &Claim) -> Option<&'static [&'static str]> {
    let sub_kind = claim.sub_kind.as_deref()?;
    EVENTS
        .iter()
        .find(|(kind, _)| *kind == sub_kind)
        .map(|(_, keywords)| *keywords)
}

/// Stopword-filtered words of four or more letters, in claim order.
fn significant_words(lower: &str) -> Vec<String> {
    let mut words = Vec::new();
    for m in SIGNIFICANT_WORD_RE.find_iter(lower) {
        let word = m.as_str();
        if STOPWORDS.contains(&word) {
            continue;
        }
        push_unique(&mut words, word.to_string());
    }
    words
}

fn extend_terms<I, S>(terms: &mut Vec<String>, additions: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    for addition in additions {
        push_unique(terms, addition.into());
    }
}

fn push_unique(terms: &mut Vec<String>, term: String) {
    if !terms.iter().any(|t| *t == term) {
        terms.push(term);
    }
}

/// Whether a claim is too vague to be checkable.
pub fn is_vague(claim: &Claim, config: &ExtractionConfig) -> bool {
    let lower = claim.text.to_lowercase();
    config
        .vague_adjectives
        .iter()
        .any(|adj| lower.contains(adj.as_str()))
}

/// Whether enrichment produced anything to search with.
pub fn has_checkable_vocabulary(claim: &Claim) -> bool {
    !claim.vocabulary.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    #[test]
    fn brave_claim_gets_the_curated_pair() {
        let mut claim = Claim::new("trait_brave", "John is brave", ClaimType::Trait, Importance::High)
            .with_sub_kind("brave");
        enrich(&mut claim, "John", &config());

        assert!(claim.vocabulary.iter().any(|t| t == "courageous"));
        assert!(claim.anti_vocabulary.iter().any(|t| t == "coward"));
        assert_eq!(claim.confidence, 0.8);
        assert!(!claim.patterns.is_empty());
    }

    #[test]
    fn claim_specific_words_come_before_lexicon_terms() {
        let mut claim = Claim::new(
            "trait_brave",
            "John bravely defended the bridge",
            ClaimType::Trait,
            Importance::High,
        );
        enrich(&mut claim, "John", &config());

        let defended_pos = claim.vocabulary.iter().position(|t| t == "defended");
        let heroic_pos = claim.vocabulary.iter().position(|t| t == "heroic");
        assert!(defended_pos.unwrap() < heroic_pos.unwrap());
    }

    #[test]
    fn unmatched_claims_fall_back_to_generic_vocabulary() {
        let mut claim = Claim::new(
            "event_x",
            "Sarah crossed the frozen river alone",
            ClaimType::Event,
            Importance::Medium,
        );
        enrich(&mut claim, "Sarah", &config());

        assert!(claim.vocabulary.iter().any(|t| t == "frozen"));
        assert!(claim.vocabulary.iter().any(|t| t == "happened"));
        assert_eq!(claim.confidence, 0.6);
    }

    #[test]
    fn relationship_vocabulary_uses_the_relation() {
        let mut claim = Claim::new(
            "relationship_mentor",
            "Thomas was Sarah's mentor",
            ClaimType::Relationship,
            Importance::Medium,
        )
        .with_sub_kind("mentor");
        enrich(&mut claim, "Sarah", &config());

        assert!(claim.vocabulary.iter().any(|t| t == "mentor"));
        assert!(claim.anti_vocabulary.iter().any(|t| t == "no mentor"));
    }

    #[test]
    fn vague_claims_are_flagged() {
        let claim = Claim::new(
            "trait_x",
            "Sarah had a complex personality",
            ClaimType::Trait,
            Importance::Low,
        );
        assert!(is_vague(&claim, &config()));
    }

    #[test]
    fn vocabulary_is_bounded() {
        let mut claim = Claim::new(
            "event_long",
            "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima \
             mike november oscar papa quebec romeo sierra tango uniform victor whiskey",
            ClaimType::Event,
            Importance::Low,
        );
        enrich(&mut claim, "Sarah", &config());
        assert!(claim.vocabulary.len() <= MAX_VOCABULARY);
    }
}
