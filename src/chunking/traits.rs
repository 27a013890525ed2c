//! Splitter trait definition.
//!
//! Defines the interface for text splitting strategies.

use crate::core::Chunk;
use crate::error::{ChunkingError, Result};

/// Trait for splitting document text into retrieval chunks.
///
/// Implementations must be deterministic: the same text and configuration
/// always produce the same chunks, so a persisted index can be rebuilt
/// identically.
///
/// # Examples
///
/// ```
/// use nyaya_rag::chunking::{CharacterSplitter, SplitConfig, Splitter};
///
/// let splitter = CharacterSplitter::new();
/// let text = "Section 378. Theft.\n\nSection 379. Punishment for theft.";
/// let chunks = splitter.split(1, text, &SplitConfig::new(1000, 0)).unwrap();
/// assert_eq!(chunks.len(), 1);
/// ```
pub trait Splitter: Send + Sync {
    /// Splits `text` from document `document_id` into chunks.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    fn split(&self, document_id: i64, text: &str, config: &SplitConfig) -> Result<Vec<Chunk>>;

    /// Returns the name of the strategy.
    fn name(&self) -> &'static str;

    /// Returns a description of the strategy.
    fn description(&self) -> &'static str {
        "No description available"
    }
}

/// Size limits shared by all splitters.
///
/// Sizes are counted in characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConfig {
    /// Target maximum chunk size in characters.
    pub chunk_size: usize,
    /// Characters carried over from the end of one chunk into the next.
    pub overlap: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            chunk_size: super::DEFAULT_CHUNK_SIZE,
            overlap: super::DEFAULT_OVERLAP,
        }
    }
}

impl SplitConfig {
    /// Creates a config with the given size and overlap.
    #[must_use]
    pub const fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Checks that the size is positive and the overlap is smaller than it.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkingError::InvalidConfig`] for a zero size and
    /// [`ChunkingError::OverlapTooLarge`] when overlap reaches the size.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ChunkingError::InvalidConfig {
                reason: "chunk_size must be > 0".to_string(),
            }
            .into());
        }
        if self.overlap >= self.chunk_size {
            return Err(ChunkingError::OverlapTooLarge {
                overlap: self.overlap,
                size: self.chunk_size,
            }
            .into());
        }
        Ok(())
    }
}
