//! Remote embeddings from the OpenAI embeddings endpoint.

use crate::Result;
use crate::embedding::Embedder;
use crate::error::StorageError;
use crate::llm::OpenAiClient;
use async_openai::types::CreateEmbeddingRequestArgs;
use tracing::debug;

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Inputs sent per embeddings request.
const REQUEST_BATCH_SIZE: usize = 256;

/// Returns the vector width produced by a known OpenAI embedding model.
#[must_use]
pub fn dimensions_for_model(model: &str) -> usize {
    match model {
        "text-embedding-3-large" => 3072,
        _ => 1536,
    }
}

/// Embedder backed by the OpenAI embeddings endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    /// Creates an embedder for `model`.
    #[must_use]
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        let model = model.into();
        let dimensions = dimensions_for_model(&model);
        Self {
            client,
            model,
            dimensions,
        }
    }

    fn request(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let input: Vec<String> = texts.iter().map(|t| (*t).to_string()).collect();
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.as_str())
            .input(input)
            .build()
            .map_err(|e| StorageError::Embedding(e.to_string()))?;

        let response = self
            .client
            .block_on(self.client.inner().embeddings().create(request))
            .map_err(|e| StorageError::Embedding(e.to_string()))?;

        let mut data = response.data;
        if data.len() != texts.len() {
            return Err(StorageError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                data.len()
            ))
            .into());
        }
        data.sort_by_key(|item| item.index);
        Ok(data.into_iter().map(|item| item.embedding).collect())
    }
}

impl Embedder for OpenAiEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.request(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| StorageError::Embedding("no embedding returned".to_string()).into())
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(REQUEST_BATCH_SIZE) {
            debug!(model = %self.model, inputs = batch.len(), "requesting embeddings");
            embeddings.extend(self.request(batch)?);
        }
        Ok(embeddings)
    }
}
