//! Novel text sources.
//!
//! The pipeline asks a [`NovelTextSource`] for raw text by book name; the
//! source is responsible for locating the file and removing public-domain
//! boilerplate before the indexer sees it.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::types::{ChronicleError, Result};

/// Provider of raw novel text.
pub trait NovelTextSource: Send + Sync {
    /// Load the text of a novel by its book name.
    fn load(&self, book_name: &str) -> Result<String>;
}

static GUTENBERG_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*\*\s*START OF (?:THIS|THE) PROJECT GUTENBERG EBOOK[^*]*\*\*\*").unwrap()
});

static GUTENBERG_END_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*\*\s*END OF (?:THIS|THE) PROJECT GUTENBERG EBOOK[^*]*\*\*\*").unwrap()
});

/// Strip Project Gutenberg front and back matter when the markers exist.
pub fn strip_boilerplate(text: &str) -> &str {
    let start = GUTENBERG_START_RE
        .find(text)
        .map(|m| m.end())
        .unwrap_or(0);
    let end = GUTENBERG_END_RE
        .find(&text[start..])
        .map(|m| start + m.start())
        .unwrap_or(text.len());
    text[start..end].trim_matches(|c: char| c.is_whitespace())
}

fn normalize(name: &str) -> String {
    name.to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Filesystem source: one `.txt` file per novel in a flat directory.
///
/// Book names are matched against file stems case-insensitively, with
/// underscores and dashes treated as spaces.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locate(&self, book_name: &str) -> Result<PathBuf> {
        let wanted = normalize(book_name);
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(normalize)
                .unwrap_or_default();
            if stem == wanted {
                return Ok(path);
            }
        }
        Err(ChronicleError::NovelNotFound(book_name.to_string()))
    }
}

impl NovelTextSource for DirectorySource {
    fn load(&self, book_name: &str) -> Result<String> {
        let path = self.locate(book_name)?;
        debug!(book = book_name, path = %path.display(), "loading novel");
        let raw = fs::read_to_string(path)?;
        Ok(strip_boilerplate(&raw).to_string())
    }
}

/// In-memory source, for tests and pre-loaded texts.
#[derive(Default)]
pub struct MemorySource {
    novels: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_novel(mut self, book_name: &str, text: impl Into<String>) -> Self {
        self.novels.insert(normalize(book_name), text.into());
        self
    }
}

impl NovelTextSource for MemorySource {
    fn load(&self, book_name: &str) -> Result<String> {
        self.novels
            .get(&normalize(book_name))
            .cloned()
            .ok_or_else(|| ChronicleError::NovelNotFound(book_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boilerplate_is_stripped_when_markers_present() {
        let text = "header junk\n*** START OF THE PROJECT GUTENBERG EBOOK MOBY DICK ***\n\
                    Call me Ishmael.\n*** END OF THE PROJECT GUTENBERG EBOOK MOBY DICK ***\nlicense";
        assert_eq!(strip_boilerplate(text), "Call me Ishmael.");
    }

    #[test]
    fn text_without_markers_is_untouched() {
        assert_eq!(strip_boilerplate("Call me Ishmael."), "Call me Ishmael.");
    }

    #[test]
    fn memory_source_normalizes_book_names() {
        let source = MemorySource::new().with_novel("Moby_Dick", "whale text");
        assert_eq!(source.load("moby dick").unwrap(), "whale text");
        assert!(matches!(
            source.load("persuasion"),
            Err(ChronicleError::NovelNotFound(_))
        ));
    }
}
