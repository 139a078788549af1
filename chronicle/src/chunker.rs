//! Chunking strategies for raw novel text.
//!
//! Strategies are tried in a fixed fallback chain: chapter headers when the
//! text carries enough of them, blank-line scene breaks otherwise, and fixed
//! word-count windows as the last resort. Each strategy discards fragments
//! below its own substance threshold.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::ChunkStrategy;

/// Configuration for chunking and annotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Minimum header matches required before chapter chunking is trusted
    pub min_header_matches: usize,
    /// Minimum chunk length in chars for the chapter strategy
    pub chapter_min_chars: usize,
    /// Minimum chunk length in chars for the scene strategy
    pub scene_min_chars: usize,
    /// Window size in words for the fixed-size strategy
    pub window_words: usize,
    /// Quoted-speech lines above this count classify a chunk as dialogue
    pub dialogue_line_threshold: usize,
    /// Action-verb hits above this count classify a chunk as action
    pub action_verb_threshold: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            min_header_matches: 5,
            chapter_min_chars: 500,
            scene_min_chars: 300,
            window_words: 1500,
            dialogue_line_threshold: 5,
            action_verb_threshold: 3,
        }
    }
}

/// A chunk span before annotation.
#[derive(Debug, Clone)]
pub(crate) struct RawChunk {
    pub id: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\n\s*(?:Chapter|CHAPTER)\s+[\dIVXLC]+|\n\s*(?:Book|BOOK)\s+[\dIVXLC]+|\n\s*(?:Part|PART)\s+[\dIVXLC]+|\n[ \t]*[A-Z][A-Z .]{1,48}[A-Z]\n",
    )
    .unwrap()
});

static SCENE_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());

/// Chunk raw text, returning the spans and the strategy that produced them.
pub(crate) fn chunk_text(text: &str, config: &IndexConfig) -> (Vec<RawChunk>, ChunkStrategy) {
    let headers: Vec<_> = HEADER_RE.find_iter(text).collect();
    if headers.len() >= config.min_header_matches {
        let chunks = chunk_by_headers(text, &headers, config.chapter_min_chars);
        if !chunks.is_empty() {
            return (chunks, ChunkStrategy::Chapter);
        }
    } else {
        debug!(
            header_matches = headers.len(),
            required = config.min_header_matches,
            "few chapter markers found, using scene chunking"
        );
    }

    let chunks = chunk_by_scenes(text, config.scene_min_chars);
    if !chunks.is_empty() {
        return (chunks, ChunkStrategy::Scene);
    }

    (chunk_fixed(text, config.window_words), ChunkStrategy::Fixed)
}

fn chunk_by_headers(
    text: &str,
    headers: &[regex::Match<'_>],
    min_chars: usize,
) -> Vec<RawChunk> {
    let mut chunks = Vec::new();
    let mut start = 0usize;

    for header in headers {
        push_span(&mut chunks, text, start, header.start(), min_chars, "ch");
        start = header.start();
    }
    push_span(&mut chunks, text, start, text.len(), min_chars, "ch");

    chunks
}

fn chunk_by_scenes(text: &str, min_chars: usize) -> Vec<RawChunk> {
    let mut chunks = Vec::new();
    let mut start = 0usize;

    for sep in SCENE_BREAK_RE.find_iter(text) {
        push_span(&mut chunks, text, start, sep.start(), min_chars, "sc");
        start = sep.end();
    }
    push_span(&mut chunks, text, start, text.len(), min_chars, "sc");

    chunks
}

fn chunk_fixed(text: &str, window_words: usize) -> Vec<RawChunk> {
    let words: Vec<regex::Match<'_>> = WORD_RE.find_iter(text).collect();
    let mut chunks = Vec::new();

    for (n, window) in words.chunks(window_words.max(1)).enumerate() {
        let (first, last) = match (window.first(), window.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => continue,
        };
        chunks.push(RawChunk {
            id: format!("fx_{n}"),
            text: text[first.start()..last.end()].to_string(),
            start: first.start(),
            end: last.end(),
        });
    }

    chunks
}

fn push_span(
    chunks: &mut Vec<RawChunk>,
    text: &str,
    start: usize,
    end: usize,
    min_chars: usize,
    prefix: &str,
) {
    if end <= start {
        return;
    }
    let span = text[start..end].trim();
    if span.len() > min_chars {
        chunks.push(RawChunk {
            id: format!("{prefix}_{}", chunks.len()),
            text: span.to_string(),
            start,
            end,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn para(tag: &str) -> String {
        format!("{tag} {}", "lorem ipsum dolor sit amet ".repeat(20))
    }

    #[test]
    fn chapter_markers_selected_when_frequent() {
        let mut text = String::new();
        for i in 1..=6 {
            text.push_str(&format!("\nChapter {i}\n\n{}", para("body")));
        }
        let (chunks, strategy) = chunk_text(&text, &IndexConfig::default());
        assert_eq!(strategy, ChunkStrategy::Chapter);
        assert!(chunks.len() >= 5);
    }

    #[test]
    fn falls_back_to_scene_breaks_below_marker_threshold() {
        let text = format!(
            "Chapter 1\n\n{}\n\n{}\n\n{}",
            para("one"),
            para("two"),
            para("three")
        );
        let (chunks, strategy) = chunk_text(&text, &IndexConfig::default());
        assert_eq!(strategy, ChunkStrategy::Scene);
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn fixed_windows_when_no_structure() {
        // Single long paragraph, no blank lines, below the scene threshold
        // after the scene pass drops nothing usable.
        let text = "word ".repeat(4000);
        let config = IndexConfig {
            scene_min_chars: 100_000,
            ..IndexConfig::default()
        };
        let (chunks, strategy) = chunk_text(&text, &config);
        assert_eq!(strategy, ChunkStrategy::Fixed);
        assert_eq!(chunks.len(), 3); // 4000 words / 1500 per window
    }

    #[test]
    fn offsets_are_monotonic_and_non_overlapping() {
        let text = format!("{}\n\n{}\n\n{}", para("a"), para("b"), para("c"));
        let (chunks, _) = chunk_text(&text, &IndexConfig::default());
        for pair in chunks.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn tiny_fragments_are_discarded() {
        let text = format!("short\n\n{}\n\nalso short", para("real scene"));
        let (chunks, _) = chunk_text(&text, &IndexConfig::default());
        assert_eq!(chunks.len(), 1);
    }
}
