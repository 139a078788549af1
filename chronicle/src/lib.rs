//! Chronicle - novel ingestion and indexing.
//!
//! Splits raw novel text into addressable chunks, annotates each with the
//! characters it mentions, a scene-type classification and timeline markers,
//! and maintains a character reverse index for O(hits) evidence lookup.
//!
//! Chunking falls back through three strategies: chapter headers, blank-line
//! scene breaks, fixed word windows. The resulting [`NovelIndex`] is built
//! once per novel and shared read-only for the rest of a verification run.

pub mod alias;
mod annotate;
mod chunker;
pub mod index;
pub mod source;
pub mod types;

pub use alias::aliases_for;
pub use chunker::IndexConfig;
pub use index::NovelIndex;
pub use source::{strip_boilerplate, DirectorySource, MemorySource, NovelTextSource};
pub use types::{Chunk, ChunkStrategy, ChronicleError, Result, SceneType, TimelineMarker};
