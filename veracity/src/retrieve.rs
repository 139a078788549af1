//! Evidence retrieval.
//!
//! Scans the chunks where the character (or an alias) appears - a hard gate;
//! no other chunk can contribute evidence - scores each against the claim's
//! vocabulary, classifies it as supporting, contradicting or neutral, and
//! returns the top-k by scene-weighted score.

use chronicle::{Chunk, NovelIndex, SceneType};
use tracing::debug;

use crate::config::RetrievalConfig;
use crate::lexicon::{contains_word, COURAGE_TRAITS, DANGER_CONTEXT, NEGATION_MARKERS, STOPWORDS};
use crate::types::{Claim, ClaimType, EvidenceItem, EvidenceKind};

/// Retrieves and ranks evidence for one claim.
#[derive(Debug, Clone, Default)]
pub struct EvidenceRetriever {
    config: RetrievalConfig,
}

impl EvidenceRetriever {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    /// Ranked, classified evidence for a claim, truncated to top-k.
    pub fn retrieve(
        &self,
        claim: &Claim,
        character: &str,
        index: &NovelIndex,
    ) -> Vec<EvidenceItem> {
        let gated = index.chunks_for(character);
        let mut items: Vec<EvidenceItem> = gated
            .iter()
            .filter_map(|chunk| self.score_chunk(claim, chunk))
            .collect();

        if self.config.detect_critical_moments {
            self.add_critical_moments(claim, &gated, &mut items);
        }

        items.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        items.truncate(self.config.top_k);

        debug!(
            claim = %claim.id,
            gated = gated.len(),
            kept = items.len(),
            "evidence retrieved"
        );
        items
    }

    fn score_chunk(&self, claim: &Claim, chunk: &Chunk) -> Option<EvidenceItem> {
        let text_lower = chunk.text.to_lowercase();
        let mut matched_terms = Vec::new();
        let mut positive_hits = 0usize;
        let mut anti_hits = 0usize;

        for term in &claim.vocabulary {
            if term_present(&text_lower, term) {
                positive_hits += 1;
                matched_terms.push(term.clone());
            }
        }
        for term in &claim.anti_vocabulary {
            if term_present(&text_lower, term) {
                anti_hits += 1;
                matched_terms.push(format!("contradiction: {term}"));
            }
        }

        // Character presence alone is the gate, not evidence.
        if positive_hits + anti_hits == 0 {
            return None;
        }

        // Relevance strength; anti hits count roughly double, contradictions
        // being rarer and more informative than keyword agreement.
        let mut score = self.config.base_score
            + self.config.term_bonus * positive_hits as f32
            + self.config.anti_penalty * anti_hits as f32;
        if chunk.text.contains('"') {
            score += self.config.dialogue_bonus;
        }
        for pattern in &claim.patterns {
            if !pattern.trim().is_empty()
                && pattern
                    .split_whitespace()
                    .all(|word| contains_word(&text_lower, word))
            {
                score += self.config.pattern_bonus;
            }
        }

        let negated = NEGATION_MARKERS
            .iter()
            .any(|marker| term_present(&text_lower, marker));

        let kind = if anti_hits > 0
            && (self.config.anti_penalty * anti_hits as f32
                >= self.config.term_bonus * positive_hits as f32
                || negated)
        {
            EvidenceKind::Contradicting
        } else if positive_hits > 0 {
            EvidenceKind::Supporting
        } else {
            EvidenceKind::Neutral
        };

        // Single-keyword matches are too weak to rank on their own.
        let (score, kind) = if positive_hits + anti_hits < self.config.min_distinct_terms
            && kind != EvidenceKind::Contradicting
        {
            (self.config.weak_evidence_score, EvidenceKind::Neutral)
        } else {
            (score, kind)
        };

        if score <= 0.0 {
            return None;
        }

        Some(EvidenceItem {
            chunk_id: chunk.id.clone(),
            excerpt: excerpt(&chunk.text, self.config.excerpt_chars),
            score,
            weight: score * self.scene_multiplier(chunk.scene),
            kind,
            scene: chunk.scene,
            matched_terms,
        })
    }

    /// Expected-but-missing pass: a scene where the claim's situational
    /// trigger co-occurs with the character but none of the claim's positive
    /// vocabulary appears is stronger counter-evidence than plain absence.
    fn add_critical_moments(
        &self,
        claim: &Claim,
        gated: &[&Chunk],
        items: &mut Vec<EvidenceItem>,
    ) {
        let triggers = situational_triggers(claim);
        if triggers.is_empty() {
            return;
        }

        for chunk in gated {
            let text_lower = chunk.text.to_lowercase();
            let trigger = match triggers
                .iter()
                .find(|t| contains_word(&text_lower, t))
            {
                Some(trigger) => trigger,
                None => continue,
            };
            if claim
                .vocabulary
                .iter()
                .any(|term| term_present(&text_lower, term))
            {
                continue;
            }

            let score = self.config.critical_moment_weight;
            let item = EvidenceItem {
                chunk_id: chunk.id.clone(),
                excerpt: excerpt(&chunk.text, self.config.excerpt_chars),
                score,
                weight: score * self.scene_multiplier(chunk.scene),
                kind: EvidenceKind::Contradicting,
                scene: chunk.scene,
                matched_terms: vec![format!("expected near '{trigger}' but absent")],
            };

            // Replace any weak item the main pass produced for this chunk.
            match items.iter_mut().find(|i| i.chunk_id == chunk.id) {
                Some(existing) if existing.kind != EvidenceKind::Contradicting => *existing = item,
                Some(_) => {}
                None => items.push(item),
            }
        }
    }

    fn scene_multiplier(&self, scene: SceneType) -> f32 {
        match scene {
            SceneType::Action => self.config.scene_weight_action,
            SceneType::Dialogue => self.config.scene_weight_dialogue,
            SceneType::Introspection => self.config.scene_weight_introspection,
        }
    }
}

/// Situational triggers for the critical-moment pass: the object of a stated
/// fear, or danger contexts for courage-like trait claims.
fn situational_triggers(claim: &Claim) -> Vec<String> {
    match claim.kind {
        ClaimType::Fear => fear_object(&claim.text).into_iter().collect(),
        ClaimType::Trait => {
            let courageous = claim
                .sub_kind
                .as_deref()
                .is_some_and(|s| COURAGE_TRAITS.contains(&s));
            if courageous {
                DANGER_CONTEXT.iter().map(|t| t.to_string()).collect()
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

/// The first content word after "afraid of" / "fear of" / "scared of".
fn fear_object(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    for marker in ["afraid of", "fear of", "scared of", "feared"] {
        if let Some(pos) = lower.find(marker) {
            let rest = &lower[pos + marker.len()..];
            let object = rest
                .split_whitespace()
                .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
                .find(|w| {
                    w.len() > 2
                        && !STOPWORDS.contains(w)
                        && !matches!(*w, "the" | "his" | "her" | "their" | "any" | "all")
                })?;
            return Some(object.to_string());
        }
    }
    None
}

/// Multi-word terms match by containment, single words at word boundaries.
fn term_present(text_lower: &str, term: &str) -> bool {
    let term_lower = term.to_lowercase();
    if term_lower.contains(' ') {
        text_lower.contains(&term_lower)
    } else {
        contains_word(text_lower, &term_lower)
    }
}

/// Char-boundary-safe excerpt.
fn excerpt(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronicle::IndexConfig;
    use crate::config::ExtractionConfig;
    use crate::extract::vocab::enrich;
    use crate::types::Importance;

    fn brave_claim() -> Claim {
        let mut claim = Claim::new("trait_brave", "John is brave", ClaimType::Trait, Importance::High)
            .with_sub_kind("brave");
        enrich(&mut claim, "John", &ExtractionConfig::default());
        claim
    }

    fn index_of(text: &str) -> NovelIndex {
        NovelIndex::build(text, &IndexConfig::default()).unwrap()
    }

    fn pad(sentence: &str) -> String {
        format!(
            "{sentence} {}",
            "the road from the village wound past quiet fields and on toward town ".repeat(5)
        )
    }

    #[test]
    fn character_gate_excludes_other_chunks() {
        let text = format!(
            "{}\n\n{}",
            pad("John stood firm and John was brave and courageous before the walls."),
            pad("Mary thought Mary saw something brave and courageous in the storm.")
        );
        let index = index_of(&text);
        let items = EvidenceRetriever::default().retrieve(&brave_claim(), "John", &index);

        assert!(!items.is_empty());
        for item in &items {
            assert_eq!(item.chunk_id, "sc_0");
        }
    }

    #[test]
    fn anti_vocabulary_dominance_classifies_as_contradicting() {
        let text = pad(
            "John ran from a small dog, terrified. John was scared and afraid, and he hid \
             behind the cart until the dog left.",
        );
        let index = index_of(&text);
        let items = EvidenceRetriever::default().retrieve(&brave_claim(), "John", &index);

        assert_eq!(items[0].kind, EvidenceKind::Contradicting);
        assert!(items[0]
            .matched_terms
            .iter()
            .any(|t| t.starts_with("contradiction:")));
    }

    #[test]
    fn single_term_matches_are_weak_neutral_evidence() {
        // Exactly one vocabulary term matches; too weak to rank on its own.
        let text = pad(
            "John watched the harvest and John said it took a brave soul to farm this soil.",
        );
        let index = index_of(&text);
        let retriever = EvidenceRetriever::new(RetrievalConfig {
            detect_critical_moments: false,
            ..RetrievalConfig::default()
        });
        let items = retriever.retrieve(&brave_claim(), "John", &index);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, EvidenceKind::Neutral);
        assert_eq!(items[0].score, 0.5);
    }

    #[test]
    fn critical_moment_surfaces_missing_courage_as_contradiction() {
        // Danger context ("battle") with the character present but no
        // courage vocabulary anywhere in the scene.
        let text = pad("The battle closed around John and John slipped quietly toward the rear.");
        let index = index_of(&text);
        let items = EvidenceRetriever::default().retrieve(&brave_claim(), "John", &index);

        assert!(items
            .iter()
            .any(|i| i.kind == EvidenceKind::Contradicting
                && i.matched_terms.iter().any(|t| t.contains("expected near"))));
    }

    #[test]
    fn action_scenes_outrank_introspection() {
        let retriever = EvidenceRetriever::default();
        let action = retriever.scene_multiplier(SceneType::Action);
        let dialogue = retriever.scene_multiplier(SceneType::Dialogue);
        let introspection = retriever.scene_multiplier(SceneType::Introspection);
        assert!(action > dialogue && dialogue > introspection);
    }

    #[test]
    fn results_are_bounded_by_top_k() {
        let mut scenes = String::new();
        for n in 0..15 {
            scenes.push_str(&pad(&format!(
                "John was brave and courageous in the {n}th trial while John pressed on."
            )));
            scenes.push_str("\n\n");
        }
        let index = index_of(&scenes);
        let items = EvidenceRetriever::default().retrieve(&brave_claim(), "John", &index);
        assert_eq!(items.len(), RetrievalConfig::default().top_k);
    }

    #[test]
    fn fear_object_extraction() {
        assert_eq!(fear_object("Sarah was afraid of water"), Some("water".into()));
        assert_eq!(fear_object("Sarah feared the sea"), Some("sea".into()));
        assert_eq!(fear_object("Sarah liked bread"), None);
    }
}
