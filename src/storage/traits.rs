//! Storage trait definition.
//!
//! Defines the document and chunk operations an index backend provides.
//! Embedding and full-text operations are backend-specific and live on
//! the implementation.

use crate::core::{Chunk, Document};
use crate::error::Result;
use serde::Serialize;

/// Trait for index storage backends.
pub trait Storage {
    /// Initializes storage (creates schema).
    ///
    /// Idempotent: safe to call on an existing index.
    ///
    /// # Errors
    ///
    /// Returns an error if schema creation fails or the stored schema
    /// version is not supported.
    fn init(&mut self) -> Result<()>;

    /// Checks if storage is initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the check cannot be performed.
    fn is_initialized(&self) -> Result<bool>;

    /// Replaces the whole index contents with `batch` atomically.
    ///
    /// Assigns chunk IDs and document IDs in `batch`. On error the previous
    /// contents are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch is inconsistent or any write fails.
    fn replace_all(&mut self, batch: &mut IndexBatch) -> Result<()>;

    /// Retrieves a chunk by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    fn get_chunk(&self, id: i64) -> Result<Option<Chunk>>;

    /// Returns the total number of chunks.
    ///
    /// # Errors
    ///
    /// Returns an error if the count query fails.
    fn chunk_count(&self) -> Result<usize>;

    /// Gets index statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if statistics cannot be gathered.
    fn stats(&self) -> Result<IndexStats>;
}

/// A document paired with its chunks, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedDocument {
    /// The document.
    pub document: Document,
    /// Its chunks in order.
    pub chunks: Vec<Chunk>,
}

/// Everything [`Storage::replace_all`] writes in one go.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexBatch {
    /// Documents with their chunks.
    pub documents: Vec<PreparedDocument>,
    /// One embedding per chunk, in document then chunk order.
    pub embeddings: Vec<Vec<f32>>,
    /// Embedding model recorded for the index.
    pub embedding_model: String,
}

impl IndexBatch {
    /// Total chunks across all documents.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.documents.iter().map(|d| d.chunks.len()).sum()
    }
}

/// Index statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Number of documents stored.
    pub document_count: usize,
    /// Number of chunks across all documents.
    pub chunk_count: usize,
    /// Number of chunks with an embedding.
    pub embedded_count: usize,
    /// Total size of all document content in bytes.
    pub total_content_size: usize,
    /// Schema version.
    pub schema_version: u32,
    /// Embedding model that built the index.
    pub embedding_model: Option<String>,
    /// Database file size in bytes (None when in memory).
    pub db_size: Option<u64>,
}
