//! Fixed-size splitting strategy.
//!
//! Cuts text into windows of at most `chunk_size` characters, optionally
//! pulling the cut back to the last newline so statute lines stay whole.

use crate::chunking::traits::{SplitConfig, Splitter};
use crate::core::Chunk;
use crate::error::Result;
use crate::io::byte_offset_of_char;

/// Fixed-size splitter that cuts on character boundaries.
///
/// # Examples
///
/// ```
/// use nyaya_rag::chunking::{FixedSplitter, SplitConfig, Splitter};
///
/// let splitter = FixedSplitter::new();
/// let text = "Section 302. Murder. ".repeat(20);
/// let chunks = splitter.split(1, &text, &SplitConfig::new(100, 0)).unwrap();
/// for chunk in &chunks {
///     assert!(chunk.char_count() <= 100);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FixedSplitter {
    line_aware: bool,
}

impl Default for FixedSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedSplitter {
    /// Creates a line-aware fixed splitter.
    #[must_use]
    pub const fn new() -> Self {
        Self { line_aware: true }
    }

    /// Sets whether cuts are pulled back to the nearest newline.
    ///
    /// The lookback covers the last tenth of the window.
    #[must_use]
    pub const fn line_aware(mut self, enabled: bool) -> Self {
        self.line_aware = enabled;
        self
    }

    /// Returns the byte offset where the chunk starting at `start` ends.
    fn find_end(&self, text: &str, start: usize, chunk_size: usize) -> usize {
        let rest = &text[start..];
        let end = start + byte_offset_of_char(rest, chunk_size);
        if !self.line_aware || end >= text.len() {
            return end;
        }

        let search_start = start + byte_offset_of_char(rest, chunk_size - chunk_size / 10);
        if let Some(newline) = text[search_start..end].rfind('\n') {
            let candidate = search_start + newline + 1;
            if candidate > start {
                return candidate;
            }
        }
        end
    }
}

impl Splitter for FixedSplitter {
    fn split(&self, document_id: i64, text: &str, config: &SplitConfig) -> Result<Vec<Chunk>> {
        config.validate()?;

        if text.is_empty() {
            return Ok(vec![]);
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut index = 0;

        while start < text.len() {
            let end = self.find_end(text, start, config.chunk_size);
            let content = &text[start..end];

            let mut chunk =
                Chunk::with_strategy(document_id, content.to_string(), start..end, index, self.name());
            chunk.has_overlap = index > 0 && config.overlap > 0;
            chunks.push(chunk);

            if end >= text.len() {
                break;
            }

            let next = if config.overlap > 0 {
                let keep = content.chars().count().saturating_sub(config.overlap);
                start + byte_offset_of_char(content, keep)
            } else {
                end
            };

            // Always make progress.
            start = if next > start { next } else { end };
            index += 1;
        }

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }

    fn description(&self) -> &'static str {
        "Fixed-size windows with optional newline alignment"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        let chunks = FixedSplitter::new()
            .split(1, "", &SplitConfig::new(100, 0))
            .unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_small_text() {
        let text = "Section 379. Punishment for theft.";
        let chunks = FixedSplitter::new()
            .split(1, text, &SplitConfig::new(100, 0))
            .unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, text);
        assert_eq!(chunks[0].strategy.as_deref(), Some("fixed"));
    }

    #[test]
    fn test_exact_windows() {
        let text = "0123456789ABCDEFGHIJ";
        let chunks = FixedSplitter::new()
            .line_aware(false)
            .split(1, text, &SplitConfig::new(10, 0))
            .unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].byte_range, 0..10);
        assert_eq!(chunks[1].byte_range, 10..20);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.document_id, 1);
        }
    }

    #[test]
    fn test_overlap() {
        let text = "0123456789ABCDEFGHIJ";
        let chunks = FixedSplitter::new()
            .line_aware(false)
            .split(1, text, &SplitConfig::new(10, 3))
            .unwrap();
        assert_eq!(chunks[1].byte_range.start, 7);
        assert_eq!(chunks[1].content, "789ABCDEFG");
        assert!(!chunks[0].has_overlap);
        assert!(chunks[1].has_overlap);
    }

    #[test]
    fn test_line_aware_cut() {
        let text = format!("{}\n{}", "a".repeat(18), "b".repeat(20));
        let chunks = FixedSplitter::new()
            .split(1, &text, &SplitConfig::new(20, 0))
            .unwrap();
        assert_eq!(chunks[0].content, format!("{}\n", "a".repeat(18)));
        assert_eq!(chunks[1].byte_range.start, 19);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let text = "धाराधाराधारा";
        let chunks = FixedSplitter::new()
            .line_aware(false)
            .split(1, text, &SplitConfig::new(4, 0))
            .unwrap();
        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert_eq!(chunk.content, "धारा");
        }
    }

    #[test]
    fn test_invalid_config() {
        let splitter = FixedSplitter::new();
        assert!(splitter.split(1, "test", &SplitConfig::new(0, 0)).is_err());
        assert!(splitter.split(1, "test", &SplitConfig::new(10, 10)).is_err());
    }
}
