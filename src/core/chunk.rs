//! Chunk representation.
//!
//! Chunks are the retrieval units of the index: slices of a document
//! produced by a splitter, each remembering where it came from.

use crate::io::truncate_chars;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A chunk of text from a document.
///
/// # Examples
///
/// ```
/// use nyaya_rag::core::Chunk;
///
/// let chunk = Chunk::new(1, "Section 379. Punishment for theft.".to_string(), 0..34, 0);
/// assert_eq!(chunk.size(), 34);
/// assert!(chunk.id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique identifier (assigned by the index).
    pub id: Option<i64>,

    /// ID of the document this chunk belongs to.
    pub document_id: i64,

    /// Chunk text.
    pub content: String,

    /// Byte range in the original document.
    pub byte_range: Range<usize>,

    /// Sequential index within the document (0-based).
    pub index: usize,

    /// Splitter that produced this chunk.
    pub strategy: Option<String>,

    /// Whether this chunk repeats text from the previous chunk.
    pub has_overlap: bool,
}

impl Chunk {
    /// Creates a new chunk.
    #[must_use]
    pub const fn new(
        document_id: i64,
        content: String,
        byte_range: Range<usize>,
        index: usize,
    ) -> Self {
        Self {
            id: None,
            document_id,
            content,
            byte_range,
            index,
            strategy: None,
            has_overlap: false,
        }
    }

    /// Creates a chunk tagged with the splitter that produced it.
    #[must_use]
    pub fn with_strategy(
        document_id: i64,
        content: String,
        byte_range: Range<usize>,
        index: usize,
        strategy: &str,
    ) -> Self {
        let mut chunk = Self::new(document_id, content, byte_range, index);
        chunk.strategy = Some(strategy.to_string());
        chunk
    }

    /// Returns the size of the chunk in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.content.len()
    }

    /// Returns the number of characters in the chunk.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Returns true if the chunk holds no text.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Returns a single-line preview of at most `max_chars` characters.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        let flat = self.content.replace('\n', " ");
        if flat.chars().count() <= max_chars {
            return flat;
        }
        format!(
            "{}...",
            truncate_chars(&flat, max_chars.saturating_sub(3))
        )
    }
}
