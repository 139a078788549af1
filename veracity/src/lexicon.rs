//! Static lexicons for pattern-based extraction and vocabulary enrichment.
//!
//! These tables define what the heuristic path can recognize. They are
//! deliberately small and curated; coverage is a tunable, not a correctness
//! property.

use once_cell::sync::Lazy;
use regex::Regex;

/// Positive personality traits recognized in backstory prose.
pub const POSITIVE_TRAITS: &[&str] = &[
    "brave", "courageous", "kind", "generous", "smart", "intelligent", "honest", "loyal",
    "confident", "optimistic", "humble", "patient",
];

/// Negative personality traits.
pub const NEGATIVE_TRAITS: &[&str] = &[
    "cowardly", "cruel", "mean", "selfish", "foolish", "stupid", "deceitful", "dishonest",
    "arrogant", "pessimistic", "proud", "impatient",
];

/// Emotional-state words; the first three mark fear claims.
pub const EMOTIONS: &[&str] = &[
    "fear", "afraid", "scared", "worried", "anxious", "happy", "sad", "angry", "disappointed",
    "hopeful", "confident",
];

/// Emotions that classify a sentence as a fear claim rather than a trait.
pub const FEAR_EMOTIONS: &[&str] = &["fear", "afraid", "scared"];

/// Life-event indicators, keyed by event sub-kind.
pub const EVENTS: &[(&str, &[&str])] = &[
    ("death", &["died", "killed", "murdered", "passed away", "death", "funeral", "grave"]),
    ("birth", &["born", "birth", "came into the world"]),
    ("orphaned", &["orphan", "lost parents", "parents died", "abandoned"]),
    ("marriage", &["married", "wedding", "wed", "spouse", "husband", "wife"]),
    ("arrest", &["arrested", "imprisoned", "jailed", "captured", "detained", "sentenced"]),
    ("education", &["studied", "learned", "trained", "taught", "educated", "school"]),
    ("injury", &["injured", "wounded", "hurt", "accident", "crash", "struck"]),
    ("conflict", &["argued", "fought", "disagreed", "conflict", "dispute", "quarrel"]),
];

/// Relationship terms.
pub const RELATIONSHIPS: &[&str] = &[
    "father", "mother", "parent", "son", "daughter", "brother", "sister", "family", "relative",
    "friend", "mentor",
];

/// Generic state/action verbs. A sentence matching nothing else but one of
/// these still becomes a claim: unverifiable specifics are a fabrication
/// signal and must not be dropped.
pub const ACTION_VERBS: &[&str] = &[
    "was", "had", "became", "knew", "felt", "saw", "met", "found", "made", "took", "gave", "lost",
    "won", "joined", "left", "started", "ended", "began", "finished", "received", "sent",
    "arrived", "departed", "rescued", "saved", "helped", "fought", "discovered", "learned",
    "taught", "created", "built", "destroyed", "escaped", "captured", "freed",
];

/// Stopwords excluded from claim-derived search vocabulary.
pub const STOPWORDS: &[&str] = &[
    "that", "this", "with", "from", "have", "been", "were", "being", "when", "where", "what",
    "which", "while", "there", "their", "they", "than", "then", "them", "these", "those", "other",
    "about", "after", "before", "would", "could", "should", "might", "must", "shall", "very",
    "just", "only", "even", "also", "some", "such", "like", "made", "make", "came", "come",
    "went", "going", "said", "told", "himself", "herself", "itself", "themselves", "into", "over",
    "under",
];

/// Explicit negation markers used to classify evidence as contradicting.
pub const NEGATION_MARKERS: &[&str] = &["not", "never", "no longer", "contrary to"];

/// Danger-context words used by the critical-moment pass for courage-like
/// trait claims.
pub const DANGER_CONTEXT: &[&str] = &[
    "danger", "attack", "attacked", "battle", "fight", "flames", "fire", "storm", "threat",
    "enemy", "peril",
];

/// Trait words whose critical moments are danger scenes.
pub const COURAGE_TRAITS: &[&str] = &["brave", "courageous", "fearless", "bold", "daring", "heroic"];

/// Keys recognized by [`trait_lexicon`], in detection priority order.
pub const TRAIT_LEXICON_KEYS: &[&str] = &[
    "brave", "courageous", "fearless", "bold", "daring", "heroic", "cruel", "brutal", "ruthless",
    "merciless", "intelligent", "smart", "clever", "wise", "brilliant", "kind", "generous",
    "compassionate", "gentle", "honest", "truthful", "sincere", "loyal", "faithful", "devoted",
];

/// Curated positive/anti vocabulary pairs for traits with well-known
/// opposites. Detecting the key in a claim triggers the pair.
pub fn trait_lexicon(word: &str) -> Option<(&'static [&'static str], &'static [&'static str])> {
    match word {
        "brave" | "courageous" | "fearless" | "bold" | "daring" | "heroic" => Some((
            &["brave", "courageous", "heroic", "fearless", "bold", "daring"],
            &["coward", "cowardly", "afraid", "scared", "terrified", "fled", "hid", "ran from", "ran away"],
        )),
        "cruel" | "brutal" | "ruthless" | "merciless" => Some((
            &["cruel", "harsh", "brutal", "merciless", "ruthless"],
            &["kind", "gentle", "merciful", "compassionate"],
        )),
        "intelligent" | "smart" | "clever" | "wise" | "brilliant" => Some((
            &["smart", "intelligent", "clever", "wise", "brilliant"],
            &["foolish", "stupid", "ignorant"],
        )),
        "kind" | "generous" | "compassionate" | "gentle" => Some((
            &["kind", "gentle", "generous", "compassionate", "caring"],
            &["cruel", "harsh", "selfish", "heartless"],
        )),
        "honest" | "truthful" | "sincere" => Some((
            &["honest", "truthful", "sincere", "frank"],
            &["lied", "deceived", "dishonest", "deceitful", "cheated"],
        )),
        "loyal" | "faithful" | "devoted" => Some((
            &["loyal", "faithful", "devoted", "steadfast"],
            &["betrayed", "abandoned", "deserted", "treacherous"],
        )),
        _ => None,
    }
}

/// Sentence boundary pattern for backstory prose.
pub static SENTENCE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?;]").unwrap());

/// Words of four or more letters, the basis of claim-derived vocabulary.
pub static SIGNIFICANT_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w{4,}\b").unwrap());

/// Temporal phrases recorded on claims.
pub static TEMPORAL_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bat \d+\b",
        r"(?i)\bage \d+\b",
        r"(?i)\byoung\b",
        r"(?i)\bchild\b",
        r"(?i)\bin \d{4}\b",
        r"(?i)\bwhen (?:he|she|they)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Extract temporal phrases from a claim sentence.
pub fn temporal_phrases(text: &str) -> Vec<String> {
    let mut phrases = Vec::new();
    for re in TEMPORAL_RES.iter() {
        for m in re.find_iter(text) {
            phrases.push(m.as_str().to_string());
        }
    }
    phrases
}

/// Whole-word containment check used across the heuristic path.
pub fn contains_word(haystack_lower: &str, word: &str) -> bool {
    let word = word.to_lowercase();
    let mut search_start = 0;
    while let Some(pos) = haystack_lower[search_start..].find(&word) {
        let start = search_start + pos;
        let end = start + word.len();
        let before_ok = start == 0
            || !haystack_lower[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let after_ok = end == haystack_lower.len()
            || !haystack_lower[end..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        search_start = end;
    }
    false
}
