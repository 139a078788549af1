//! Chunk annotation: character detection, scene typing, timeline markers.

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::chunker::{IndexConfig, RawChunk};
use crate::types::{Chunk, SceneType, TimelineMarker};

/// Capitalized tokens that are never character names. Sentence-initial words
/// and common pronouns dominate the false positives of the capitalization
/// heuristic, so the list is maintained separately from the stopword list
/// used for claim vocabulary.
static CAPITALIZED_STOPLIST: &[&str] = &[
    "The", "But", "And", "Yet", "Nor", "For", "She", "His", "Her", "Him", "They", "Them", "There",
    "Then", "That", "This", "These", "Those", "When", "Where", "While", "What", "Which", "Who",
    "How", "Why", "However", "Nevertheless", "Perhaps", "After", "Before", "Once", "Now", "Here",
    "Yes", "Not", "With", "From", "Into", "Upon", "Above", "Below", "Chapter", "Book", "Part",
    "Mister", "Madam",
];

static NAME_CANDIDATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][a-z]{2,20}\b").unwrap());

static AGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:at age|age|when (?:he|she) was|turned)\s+(\d{1,3})\b").unwrap());

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(1[0-9]{3}|20[0-9]{2})\b").unwrap());

static DIALOGUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"["'][^"']+["']\s*(?:said|asked|replied|answered|shouted|whispered|cried)"#)
        .unwrap()
});

static ACTION_VERB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:ran|jumped|fought|attacked|walked|moved|struck|fled|charged|seized|grabbed)\b")
        .unwrap()
});

/// Annotate a raw chunk span with characters, scene type and timeline marks.
pub(crate) fn annotate(raw: RawChunk, config: &IndexConfig) -> Chunk {
    let characters = detect_characters(&raw.text);
    let scene = classify_scene(&raw.text, config);
    let timeline = timeline_markers(&raw.text);
    let word_count = raw.text.split_whitespace().count();

    Chunk {
        id: raw.id,
        text: raw.text,
        start: raw.start,
        end: raw.end,
        scene,
        characters,
        timeline,
        word_count,
    }
}

/// Detect likely character names in a chunk.
///
/// A capitalized token is kept only when it survives the stoplist and
/// recurs within the chunk; single mentions are treated as noise from
/// sentence-initial capitalization.
pub(crate) fn detect_characters(text: &str) -> BTreeSet<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for m in NAME_CANDIDATE_RE.find_iter(text) {
        let token = m.as_str();
        if CAPITALIZED_STOPLIST.contains(&token) {
            continue;
        }
        *counts.entry(token).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name.to_string())
        .collect()
}

fn classify_scene(text: &str, config: &IndexConfig) -> SceneType {
    let dialogue_lines = DIALOGUE_RE.find_iter(text).count();
    if dialogue_lines > config.dialogue_line_threshold {
        return SceneType::Dialogue;
    }

    let action_hits = ACTION_VERB_RE.find_iter(text).count();
    if action_hits > config.action_verb_threshold {
        return SceneType::Action;
    }

    SceneType::Introspection
}

fn timeline_markers(text: &str) -> Vec<TimelineMarker> {
    let mut markers = Vec::new();

    for cap in AGE_RE.captures_iter(text) {
        if let Ok(age) = cap[1].parse::<u32>() {
            if age < 150 {
                markers.push(TimelineMarker::Age(age));
            }
        }
    }

    for cap in YEAR_RE.captures_iter(text) {
        if let Ok(year) = cap[1].parse::<u16>() {
            markers.push(TimelineMarker::Year(year));
        }
    }

    markers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str) -> RawChunk {
        RawChunk {
            id: "sc_0".into(),
            text: text.to_string(),
            start: 0,
            end: text.len(),
        }
    }

    #[test]
    fn recurring_names_detected_single_mentions_dropped() {
        let text = "Sarah stood at the cliff. Sarah hesitated while Thomas watched. \
                    Eventually the storm passed.";
        let characters = detect_characters(text);
        assert!(characters.contains("Sarah"));
        // Thomas and Eventually appear once each
        assert!(!characters.contains("Thomas"));
        assert!(!characters.contains("Eventually"));
    }

    #[test]
    fn stoplist_words_never_become_characters() {
        let text = "However the rain fell. However it stopped. The end. The start.";
        let characters = detect_characters(text);
        assert!(characters.is_empty());
    }

    #[test]
    fn dialogue_scene_classification() {
        let line = "\"Are you sure?\" asked Thomas. ";
        let chunk = annotate(raw(&line.repeat(8)), &IndexConfig::default());
        assert_eq!(chunk.scene, SceneType::Dialogue);
    }

    #[test]
    fn action_scene_classification() {
        let text = "He ran through the gate. He jumped the wall. They fought in the \
                    courtyard and he attacked again before the guards moved.";
        let chunk = annotate(raw(text), &IndexConfig::default());
        assert_eq!(chunk.scene, SceneType::Action);
    }

    #[test]
    fn introspective_default() {
        let chunk = annotate(
            raw("She wondered quietly about the years gone by."),
            &IndexConfig::default(),
        );
        assert_eq!(chunk.scene, SceneType::Introspection);
    }

    #[test]
    fn age_and_year_markers() {
        let text = "At age 12 the war began, and by 1847 nothing remained.";
        let markers = timeline_markers(text);
        assert!(markers.contains(&TimelineMarker::Age(12)));
        assert!(markers.contains(&TimelineMarker::Year(1847)));
    }
}
