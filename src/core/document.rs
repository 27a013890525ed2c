//! Corpus documents.
//!
//! A document is one unit of raw text read by the corpus loader, usually a
//! whole statute file. Documents are split into chunks before indexing.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A loaded corpus document.
///
/// # Examples
///
/// ```
/// use nyaya_rag::core::Document;
///
/// let doc = Document::from_content("Section 378. Theft.".to_string());
/// assert_eq!(doc.size(), 19);
/// assert!(doc.source.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier (assigned by the index).
    pub id: Option<i64>,

    /// Source file path (if loaded from disk).
    pub source: Option<PathBuf>,

    /// Document text.
    pub content: String,

    /// Document metadata.
    pub metadata: DocumentMetadata,
}

/// Metadata associated with a document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Unix timestamp when the document was loaded.
    pub loaded_at: i64,

    /// Total size in bytes.
    pub size: usize,

    /// Line count.
    pub line_count: usize,

    /// Number of chunks (set after splitting).
    pub chunk_count: Option<usize>,
}

impl Document {
    /// Creates a document from raw text with no source path.
    #[must_use]
    pub fn from_content(content: String) -> Self {
        let metadata = DocumentMetadata {
            loaded_at: current_timestamp(),
            size: content.len(),
            line_count: content.lines().count(),
            chunk_count: None,
        };
        Self {
            id: None,
            source: None,
            content,
            metadata,
        }
    }

    /// Creates a document read from `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use nyaya_rag::core::Document;
    /// use std::path::PathBuf;
    ///
    /// let doc = Document::from_file(PathBuf::from("data/ipc-data.txt"), "text".to_string());
    /// assert_eq!(doc.name(), "ipc-data.txt");
    /// ```
    #[must_use]
    pub fn from_file(path: PathBuf, content: String) -> Self {
        let mut doc = Self::from_content(content);
        doc.source = Some(path);
        doc
    }

    /// Returns the size of the document in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.metadata.size
    }

    /// Returns true if the document has no text.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Display name: the source file name, or `inline` for in-memory text.
    #[must_use]
    pub fn name(&self) -> String {
        self.source
            .as_ref()
            .and_then(|p| p.file_name())
            .map_or_else(
                || "inline".to_string(),
                |n| n.to_string_lossy().to_string(),
            )
    }

    /// Records how many chunks the document was split into.
    pub const fn set_chunk_count(&mut self, count: usize) {
        self.metadata.chunk_count = Some(count);
    }
}

/// Returns current Unix timestamp.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_content_metadata() {
        let doc = Document::from_content("line one\nline two\nline three".to_string());
        assert_eq!(doc.metadata.line_count, 3);
        assert_eq!(doc.size(), 28);
        assert!(doc.metadata.chunk_count.is_none());
        assert!(doc.metadata.loaded_at > 0);
    }

    #[test]
    fn test_name_without_source() {
        let doc = Document::from_content(String::new());
        assert_eq!(doc.name(), "inline");
        assert!(doc.is_empty());
    }

    #[test]
    fn test_set_chunk_count() {
        let mut doc = Document::from_content("abc".to_string());
        doc.set_chunk_count(4);
        assert_eq!(doc.metadata.chunk_count, Some(4));
    }
}
