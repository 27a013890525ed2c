//! Top-k retrieval for the chat chain.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::search::{SearchConfig, SearchMode, search};
use crate::storage::SqliteIndex;
use serde::Serialize;
use tracing::debug;

/// A chunk returned for a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    /// Chunk ID.
    pub chunk_id: i64,
    /// Document the chunk came from.
    pub document_id: i64,
    /// Chunk index within the document.
    pub index: usize,
    /// Chunk text.
    pub content: String,
    /// Ranking score (higher is better).
    pub score: f64,
    /// Retrieval mode that produced the score.
    pub mode: SearchMode,
}

/// Something that returns relevant passages for a query.
pub trait Retriever {
    /// Returns the most relevant chunks for `query`, best first.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>>;
}

/// Retriever over a [`SqliteIndex`].
pub struct IndexRetriever {
    index: SqliteIndex,
    embedder: Box<dyn Embedder>,
    config: SearchConfig,
}

impl std::fmt::Debug for IndexRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexRetriever")
            .field("index", &self.index)
            .field("embedder", &self.embedder.model_name())
            .field("config", &self.config)
            .finish()
    }
}

impl IndexRetriever {
    /// Creates a retriever. `embedder` must be the one that built the index.
    #[must_use]
    pub fn new(index: SqliteIndex, embedder: Box<dyn Embedder>, config: SearchConfig) -> Self {
        Self {
            index,
            embedder,
            config,
        }
    }

    /// Returns the underlying index.
    #[must_use]
    pub const fn index(&self) -> &SqliteIndex {
        &self.index
    }

    /// Returns the search configuration.
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }
}

impl Retriever for IndexRetriever {
    fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>> {
        let results = search(&self.index, self.embedder.as_ref(), query, &self.config)?;

        Ok(results
            .into_iter()
            .map(|result| {
                debug!(
                    chunk_id = result.chunk_id,
                    score = result.score,
                    mode = %self.config.mode,
                    preview = %result.chunk.preview(60),
                    "retrieved chunk"
                );
                RetrievedChunk {
                    chunk_id: result.chunk_id,
                    document_id: result.chunk.document_id,
                    index: result.chunk.index,
                    content: result.chunk.content,
                    score: result.score,
                    mode: self.config.mode,
                }
            })
            .collect())
    }
}
