//! Separator-based splitting strategy.
//!
//! Splits text on a separator (blank lines by default) and greedily merges
//! the pieces back together until the next piece would push a chunk past
//! `chunk_size` characters. With overlap enabled, trailing pieces of one
//! chunk are carried into the next while they fit within `overlap`.
//!
//! A single piece longer than `chunk_size` is emitted on its own with a
//! warning rather than cut mid-section.

use crate::chunking::DEFAULT_SEPARATOR;
use crate::chunking::traits::{SplitConfig, Splitter};
use crate::core::Chunk;
use crate::error::{ChunkingError, Result};
use std::collections::VecDeque;
use std::ops::Range;
use tracing::warn;

/// A separator-delimited piece of the source text.
#[derive(Debug, Clone, Copy)]
struct Piece<'a> {
    text: &'a str,
    start: usize,
    chars: usize,
}

/// Splitter that breaks text on a separator and merges the pieces.
///
/// # Examples
///
/// ```
/// use nyaya_rag::chunking::{CharacterSplitter, SplitConfig, Splitter};
///
/// let text = "section_[378] Theft.\n\nsection_[379] Punishment for theft.";
/// let chunks = CharacterSplitter::new()
///     .split(1, text, &SplitConfig::new(25, 0))
///     .unwrap();
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(chunks[0].content, "section_[378] Theft.");
/// ```
#[derive(Debug, Clone)]
pub struct CharacterSplitter {
    separator: String,
}

impl Default for CharacterSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterSplitter {
    /// Creates a splitter that breaks on blank lines.
    #[must_use]
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_SEPARATOR)
    }

    /// Creates a splitter with a custom separator.
    #[must_use]
    pub fn with_separator(separator: &str) -> Self {
        Self {
            separator: separator.to_string(),
        }
    }

    /// Returns the separator.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Splits `text` into non-empty pieces, remembering their byte offsets.
    fn pieces<'a>(&self, text: &'a str) -> Vec<Piece<'a>> {
        let mut pieces = Vec::new();
        let mut start = 0;

        for (pos, _) in text.match_indices(self.separator.as_str()) {
            if pos > start {
                pieces.push(Self::piece(text, start, pos));
            }
            start = pos + self.separator.len();
        }
        if start < text.len() {
            pieces.push(Self::piece(text, start, text.len()));
        }

        pieces
    }

    fn piece(text: &str, start: usize, end: usize) -> Piece<'_> {
        let slice = &text[start..end];
        Piece {
            text: slice,
            start,
            chars: slice.chars().count(),
        }
    }

    /// Joins the window into a chunk, or returns `None` if it is blank.
    ///
    /// The range spans the trimmed source text. Content equals that slice
    /// except that runs of separators are collapsed to one.
    fn emit(&self, window: &VecDeque<Piece<'_>>) -> Option<(String, Range<usize>)> {
        let joined = window
            .iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join(&self.separator);
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            return None;
        }

        let start = window.iter().find_map(|p| {
            let lead = p.text.len() - p.text.trim_start().len();
            (lead < p.text.len()).then_some(p.start + lead)
        })?;
        let end = window.iter().rev().find_map(|p| {
            let kept = p.text.trim_end().len();
            (kept > 0).then_some(p.start + kept)
        })?;

        Some((trimmed.to_string(), start..end))
    }
}

impl Splitter for CharacterSplitter {
    fn split(&self, document_id: i64, text: &str, config: &SplitConfig) -> Result<Vec<Chunk>> {
        config.validate()?;
        if self.separator.is_empty() {
            return Err(ChunkingError::InvalidConfig {
                reason: "separator must not be empty".to_string(),
            }
            .into());
        }

        let separator_len = self.separator.chars().count();
        let mut chunks = Vec::new();
        let mut window: VecDeque<Piece<'_>> = VecDeque::new();
        let mut total = 0usize;
        let mut carried = false;

        let flush = |window: &VecDeque<Piece<'_>>, carried: bool, chunks: &mut Vec<Chunk>| {
            if let Some((content, range)) = self.emit(window) {
                let mut chunk =
                    Chunk::with_strategy(document_id, content, range, chunks.len(), self.name());
                chunk.has_overlap = carried;
                chunks.push(chunk);
            }
        };

        for piece in self.pieces(text) {
            let joiner = if window.is_empty() { 0 } else { separator_len };

            if total + piece.chars + joiner > config.chunk_size && !window.is_empty() {
                if total > config.chunk_size {
                    warn!(
                        chars = total,
                        chunk_size = config.chunk_size,
                        "created a chunk larger than the configured size"
                    );
                }
                flush(&window, carried, &mut chunks);

                // Drop leading pieces until what remains fits the overlap
                // and leaves room for the incoming piece.
                while let Some(&front) = window.front() {
                    let over_overlap = total > config.overlap;
                    let no_room =
                        total + piece.chars + separator_len > config.chunk_size && total > 0;
                    if !(over_overlap || no_room) {
                        break;
                    }
                    window.pop_front();
                    let dropped_joiner = if window.is_empty() { 0 } else { separator_len };
                    total -= front.chars + dropped_joiner;
                }
                carried = !window.is_empty();
            }

            let joiner = if window.is_empty() { 0 } else { separator_len };
            total += piece.chars + joiner;
            window.push_back(piece);
        }

        if total > config.chunk_size {
            warn!(
                chars = total,
                chunk_size = config.chunk_size,
                "created a chunk larger than the configured size"
            );
        }
        flush(&window, carried, &mut chunks);

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "character"
    }

    fn description(&self) -> &'static str {
        "Separator-based splitting with greedy merge up to the chunk size"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
        CharacterSplitter::new()
            .split(7, text, &SplitConfig::new(chunk_size, overlap))
            .unwrap()
    }

    #[test]
    fn test_empty_text() {
        assert!(split("", 1000, 0).is_empty());
        assert!(split("\n\n\n\n", 1000, 0).is_empty());
    }

    #[test]
    fn test_everything_fits() {
        let text = "section_[378] Theft.\n\nsection_[379] Punishment for theft.";
        let chunks = split(text, 1000, 0);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, text);
        assert_eq!(chunks[0].byte_range, 0..text.len());
        assert_eq!(chunks[0].document_id, 7);
        assert_eq!(chunks[0].strategy.as_deref(), Some("character"));
    }

    #[test]
    fn test_merge_stops_at_chunk_size() {
        // "aaaa\n\nbbbb" is exactly 10 characters.
        let chunks = split("aaaa\n\nbbbb\n\ncccc", 10, 0);
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["aaaa\n\nbbbb", "cccc"]);
        assert_eq!(chunks[1].byte_range, 12..16);
        assert_eq!(chunks[1].index, 1);
        assert!(!chunks[1].has_overlap);
    }

    #[test]
    fn test_overlap_carries_trailing_piece() {
        let chunks = split("aaaa\n\nbbbb\n\ncccc", 10, 4);
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["aaaa\n\nbbbb", "bbbb\n\ncccc"]);
        assert!(chunks[1].has_overlap);
    }

    #[test]
    fn test_oversized_piece_kept_whole() {
        let long = "x".repeat(25);
        let text = format!("{long}\n\ny");
        let chunks = split(&text, 10, 0);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, long);
        assert_eq!(chunks[1].content, "y");
    }

    #[test]
    fn test_chunks_are_trimmed() {
        let chunks = split("  alpha  \n\n\n\n beta ", 1000, 0);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "alpha  \n\n beta");
        assert_eq!(chunks[0].byte_range, 2..18);
    }

    #[test]
    fn test_range_slices_to_content() {
        let text = "\nsection_[378] Theft.\n\nsection_[379] Punishment.\n\nsection_[302] Murder.\n";
        for overlap in [0, 30] {
            for chunk in split(text, 50, overlap) {
                assert_eq!(&text[chunk.byte_range.clone()], chunk.content);
            }
        }
    }

    #[test]
    fn test_custom_separator() {
        let chunks = CharacterSplitter::with_separator("\n")
            .split(1, "one\ntwo\nthree", &SplitConfig::new(7, 0))
            .unwrap();
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["one\ntwo", "three"]);
    }

    #[test]
    fn test_empty_separator_rejected() {
        let result = CharacterSplitter::with_separator("").split(1, "abc", &SplitConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_multibyte_counts_characters() {
        // Each piece is 4 characters but 12 bytes.
        let chunks = split("धारा\n\nधारा", 10, 0);
        assert_eq!(chunks.len(), 1);
    }
}
