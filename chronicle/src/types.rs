//! Core types for indexed novels.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Dominant texture of a chunk, used to weight evidence drawn from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneType {
    /// Quoted speech dominates
    Dialogue,
    /// Physical action dominates
    Action,
    /// Neither; narration or inner monologue
    Introspection,
}

/// A time reference found inside a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineMarker {
    /// An age mention with a digit value ("at age 12"; spelled-out ages are
    /// not matched)
    Age(u32),
    /// A four-digit year between 1000 and 2999
    Year(u16),
}

/// A contiguous span of novel text with retrieval metadata.
///
/// Chunks are created once per novel by [`crate::NovelIndex::build`] and are
/// immutable afterwards. Offsets are byte positions into the raw novel text
/// and are monotonic and non-overlapping within one chunking pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable identifier, prefixed by chunking strategy (`ch_`, `sc_`, `fx_`)
    pub id: String,
    /// Chunk text, trimmed of surrounding whitespace
    pub text: String,
    /// Byte offset of the span start in the raw text
    pub start: usize,
    /// Byte offset of the span end in the raw text
    pub end: usize,
    /// Scene classification
    pub scene: SceneType,
    /// Character names detected in this chunk (recurring capitalized tokens)
    pub characters: BTreeSet<String>,
    /// Age and year mentions found in this chunk
    pub timeline: Vec<TimelineMarker>,
    /// Word count, for diagnostics
    pub word_count: usize,
}

impl Chunk {
    /// Whether any of the given names appears in this chunk's character set.
    pub fn mentions_any(&self, names: &[String]) -> bool {
        names.iter().any(|n| self.characters.contains(n))
    }
}

/// Strategy that produced a chunking pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Split on chapter/book/part headers
    Chapter,
    /// Split on blank-line scene breaks
    Scene,
    /// Fixed word-count windows
    Fixed,
}

/// Error types for novel ingestion and indexing.
#[derive(Debug, thiserror::Error)]
pub enum ChronicleError {
    /// The requested novel could not be located by the text source
    #[error("Novel not found: {0}")]
    NovelNotFound(String),

    /// Reading the novel from storage failed
    #[error("Failed to read novel: {0}")]
    Io(#[from] std::io::Error),

    /// The text produced no chunks above the substance thresholds
    #[error("No usable chunks produced from novel text")]
    NoChunks,
}

pub type Result<T> = std::result::Result<T, ChronicleError>;
