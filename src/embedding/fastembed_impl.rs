//! `FastEmbed`-based local embedder.
//!
//! Runs all-MiniLM-L6-v2 locally through fastembed-rs. Only available when
//! the `fastembed-embeddings` feature is enabled.

use crate::Result;
use crate::embedding::Embedder;
use crate::error::StorageError;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, OnceLock};

/// Output width of all-MiniLM-L6-v2.
pub const FASTEMBED_DIMENSIONS: usize = 384;

/// Lazily loaded model shared by all embedders.
static EMBEDDING_MODEL: OnceLock<Mutex<fastembed::TextEmbedding>> = OnceLock::new();

/// Local embedder using all-MiniLM-L6-v2.
///
/// The model is loaded on the first embed call.
#[derive(Debug, Default, Clone, Copy)]
pub struct FastEmbedEmbedder;

impl FastEmbedEmbedder {
    /// Creates a new `FastEmbed` embedder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn model() -> Result<&'static Mutex<fastembed::TextEmbedding>> {
        if let Some(model) = EMBEDDING_MODEL.get() {
            return Ok(model);
        }

        let options = fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2)
            .with_show_download_progress(false);
        let model = fastembed::TextEmbedding::try_new(options)
            .map_err(|e| StorageError::Embedding(format!("failed to load model: {e}")))?;

        // Another thread may have won the race; either instance is fine.
        let _ = EMBEDDING_MODEL.set(Mutex::new(model));
        EMBEDDING_MODEL
            .get()
            .ok_or_else(|| StorageError::Embedding("model initialization failed".to_string()).into())
    }
}

impl Embedder for FastEmbedEmbedder {
    fn dimensions(&self) -> usize {
        FASTEMBED_DIMENSIONS
    }

    fn model_name(&self) -> &str {
        "all-MiniLM-L6-v2"
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::Embedding("no embedding returned".to_string()).into())
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut model = Self::model()?
            .lock()
            .map_err(|e| StorageError::Embedding(format!("model lock poisoned: {e}")))?;

        // ONNX runtime can panic on malformed input.
        let result = catch_unwind(AssertUnwindSafe(|| model.embed(texts, None)));

        result
            .map_err(|panic_info| {
                let message = panic_info
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic_info.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                StorageError::Embedding(format!("ONNX runtime panic: {message}"))
            })?
            .map_err(|e| StorageError::Embedding(format!("batch embedding failed: {e}")).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata() {
        let embedder = FastEmbedEmbedder::new();
        assert_eq!(embedder.dimensions(), FASTEMBED_DIMENSIONS);
        assert_eq!(embedder.model_name(), "all-MiniLM-L6-v2");
    }

    #[test]
    fn test_empty_batch() {
        assert!(FastEmbedEmbedder::new().embed_batch(&[]).unwrap().is_empty());
    }

    #[test]
    #[ignore = "requires fastembed model download"]
    fn test_embed_success() {
        let embedding = FastEmbedEmbedder::new().embed("culpable homicide").unwrap();
        assert_eq!(embedding.len(), FASTEMBED_DIMENSIONS);
    }
}
