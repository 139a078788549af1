//! The built novel index: annotated chunks plus a character reverse index.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::alias::aliases_for;
use crate::annotate::annotate;
use crate::chunker::{chunk_text, IndexConfig};
use crate::types::{Chunk, ChunkStrategy, ChronicleError, Result};

/// An indexed novel.
///
/// Built once per novel, immutable afterwards; safe to share behind an `Arc`
/// across any number of concurrent readers. Serializable so processed novels
/// can be cached between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovelIndex {
    chunks: Vec<Chunk>,
    strategy: ChunkStrategy,
    /// Reverse index: character name -> indices of chunks mentioning it
    by_character: HashMap<String, Vec<usize>>,
}

impl NovelIndex {
    /// Chunk and annotate raw novel text.
    ///
    /// Fails with [`ChronicleError::NoChunks`] when no strategy produces a
    /// chunk above its substance threshold (empty or degenerate input).
    pub fn build(text: &str, config: &IndexConfig) -> Result<Self> {
        let (raw_chunks, strategy) = chunk_text(text, config);
        if raw_chunks.is_empty() {
            return Err(ChronicleError::NoChunks);
        }

        let chunks: Vec<Chunk> = raw_chunks
            .into_iter()
            .map(|raw| annotate(raw, config))
            .collect();

        let mut by_character: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            for name in &chunk.characters {
                by_character.entry(name.clone()).or_default().push(idx);
            }
        }

        info!(
            chunks = chunks.len(),
            characters = by_character.len(),
            strategy = ?strategy,
            "novel indexed"
        );

        Ok(Self {
            chunks,
            strategy,
            by_character,
        })
    }

    /// All chunks, in text order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Strategy selected by the chunking fallback chain.
    pub fn strategy(&self) -> ChunkStrategy {
        self.strategy
    }

    /// Number of distinct characters in the reverse index.
    pub fn character_count(&self) -> usize {
        self.by_character.len()
    }

    /// Chunks mentioning the character under any recognized alias.
    ///
    /// Lookup is O(hits) via the reverse index; results are deduplicated and
    /// returned in text order. Chunks that never mention the character (or
    /// an alias) are never returned, regardless of other content.
    pub fn chunks_for(&self, character: &str) -> Vec<&Chunk> {
        let aliases = aliases_for(character);
        let mut indices: Vec<usize> = aliases
            .iter()
            .filter_map(|alias| self.by_character.get(alias))
            .flatten()
            .copied()
            .collect();
        indices.sort_unstable();
        indices.dedup();

        indices.into_iter().map(|idx| &self.chunks[idx]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_novel() -> String {
        let filler = "the long road wound on through valley and hill for days on end ".repeat(6);
        format!(
            "Sarah walked the road while Sarah sang. {filler}\n\n\
             Thomas waited by the bridge, and Thomas grumbled. {filler}\n\n\
             Nobody came to the crossing that night. {filler}"
        )
    }

    #[test]
    fn reverse_index_answers_character_lookup() {
        let index = NovelIndex::build(&sample_novel(), &IndexConfig::default()).unwrap();
        let sarah_chunks = index.chunks_for("Sarah");
        assert_eq!(sarah_chunks.len(), 1);
        assert!(sarah_chunks[0].characters.contains("Sarah"));

        assert!(index.chunks_for("Ishmael").is_empty());
    }

    #[test]
    fn indexing_is_idempotent() {
        let text = sample_novel();
        let a = NovelIndex::build(&text, &IndexConfig::default()).unwrap();
        let b = NovelIndex::build(&text, &IndexConfig::default()).unwrap();

        assert_eq!(a.chunks.len(), b.chunks.len());
        for (ca, cb) in a.chunks.iter().zip(b.chunks.iter()) {
            assert_eq!(ca.id, cb.id);
            assert_eq!(ca.start, cb.start);
            assert_eq!(ca.end, cb.end);
        }
    }

    #[test]
    fn empty_text_is_rejected() {
        assert!(matches!(
            NovelIndex::build("", &IndexConfig::default()),
            Err(ChronicleError::NoChunks)
        ));
    }

    #[test]
    fn index_round_trips_through_serde() {
        let index = NovelIndex::build(&sample_novel(), &IndexConfig::default()).unwrap();
        let json = serde_json::to_string(&index).unwrap();
        let restored: NovelIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.chunks().len(), index.chunks().len());
        assert_eq!(restored.chunks_for("Sarah").len(), 1);
    }
}
