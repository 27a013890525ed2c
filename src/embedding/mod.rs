//! Embedding generation for semantic retrieval.
//!
//! Three backends implement [`Embedder`]:
//!
//! - [`OpenAiEmbedder`]: remote embeddings (`text-embedding-ada-002` by default)
//! - [`HashEmbedder`]: deterministic lexical pseudo-embeddings, no network
//! - `FastEmbedEmbedder`: local all-MiniLM-L6-v2 (feature `fastembed-embeddings`)

mod hash;
mod openai;

#[cfg(feature = "fastembed-embeddings")]
mod fastembed_impl;

pub use hash::{HASH_DIMENSIONS, HashEmbedder};
pub use openai::{DEFAULT_EMBEDDING_MODEL, OpenAiEmbedder, dimensions_for_model};

#[cfg(feature = "fastembed-embeddings")]
pub use fastembed_impl::{FASTEMBED_DIMENSIONS, FastEmbedEmbedder};

use crate::error::{Error, Result};
use crate::llm::OpenAiClient;
use std::fmt;
use std::str::FromStr;

/// Trait for embedding generators.
///
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Examples
///
/// ```
/// use nyaya_rag::embedding::{Embedder, HashEmbedder};
///
/// let embedder = HashEmbedder::new(128);
/// let embedding = embedder.embed("criminal intimidation").unwrap();
/// assert_eq!(embedding.len(), embedder.dimensions());
/// ```
pub trait Embedder: Send + Sync {
    /// Returns the embedding dimensions.
    fn dimensions(&self) -> usize;

    /// Returns the name of the model producing the vectors.
    fn model_name(&self) -> &str;

    /// Generates an embedding for the given text.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generates embeddings for multiple texts, in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails for any text.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Embedding backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbedderKind {
    /// OpenAI embeddings endpoint.
    #[default]
    OpenAi,
    /// Hash-based lexical embeddings.
    Hash,
    /// Local `FastEmbed` model.
    FastEmbed,
}

impl FromStr for EmbedderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "hash" => Ok(Self::Hash),
            "fastembed" => Ok(Self::FastEmbed),
            _ => Err(Error::config(format!(
                "unknown embedder: {s} (expected openai, hash or fastembed)"
            ))),
        }
    }
}

impl fmt::Display for EmbedderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Hash => write!(f, "hash"),
            Self::FastEmbed => write!(f, "fastembed"),
        }
    }
}

/// Creates an embedder of the given kind.
///
/// `model` names the OpenAI embedding model and is ignored by the other
/// backends. `client` is required for [`EmbedderKind::OpenAi`].
///
/// # Errors
///
/// Returns [`Error::Config`] when the OpenAI backend has no client or the
/// `FastEmbed` backend was not compiled in.
pub fn create_embedder(
    kind: EmbedderKind,
    model: &str,
    client: Option<&OpenAiClient>,
) -> Result<Box<dyn Embedder>> {
    match kind {
        EmbedderKind::OpenAi => {
            let client = client
                .ok_or_else(|| Error::config("the openai embedder needs an API client"))?;
            Ok(Box::new(OpenAiEmbedder::new(client.clone(), model)))
        }
        EmbedderKind::Hash => Ok(Box::new(HashEmbedder::default())),
        EmbedderKind::FastEmbed => create_fastembed(),
    }
}

#[cfg(feature = "fastembed-embeddings")]
fn create_fastembed() -> Result<Box<dyn Embedder>> {
    Ok(Box::new(FastEmbedEmbedder::new()))
}

#[cfg(not(feature = "fastembed-embeddings"))]
fn create_fastembed() -> Result<Box<dyn Embedder>> {
    Err(Error::config(
        "the fastembed embedder requires the fastembed-embeddings feature",
    ))
}

/// Computes cosine similarity between two embedding vectors.
///
/// Returns a value between -1.0 (opposite) and 1.0 (identical), or 0.0 if
/// the vectors have different lengths or zero magnitude.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0], 1.0 ; "identical")]
    #[test_case(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], 0.0 ; "orthogonal")]
    #[test_case(&[1.0, 0.0, 0.0], &[-1.0, 0.0, 0.0], -1.0 ; "opposite")]
    #[test_case(&[1.0, 0.0], &[1.0, 0.0, 0.0], 0.0 ; "different lengths")]
    #[test_case(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0], 0.0 ; "zero vector")]
    fn test_cosine_similarity(a: &[f32], b: &[f32], expected: f32) {
        assert!((cosine_similarity(a, b) - expected).abs() < 1e-6);
    }

    #[test_case("openai", EmbedderKind::OpenAi)]
    #[test_case("HASH", EmbedderKind::Hash)]
    #[test_case("fastembed", EmbedderKind::FastEmbed)]
    fn test_parse_kind(name: &str, expected: EmbedderKind) {
        assert_eq!(name.parse::<EmbedderKind>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_kind() {
        assert!(matches!(
            "word2vec".parse::<EmbedderKind>(),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_kind_display_round_trips() {
        for kind in [EmbedderKind::OpenAi, EmbedderKind::Hash, EmbedderKind::FastEmbed] {
            assert_eq!(kind.to_string().parse::<EmbedderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_create_hash_embedder_needs_no_client() {
        let embedder = create_embedder(EmbedderKind::Hash, "ignored", None).unwrap();
        assert_eq!(embedder.model_name(), "hash");
        assert_eq!(embedder.dimensions(), HASH_DIMENSIONS);
    }

    #[test]
    fn test_create_openai_embedder_without_client() {
        let result = create_embedder(EmbedderKind::OpenAi, DEFAULT_EMBEDDING_MODEL, None);
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_default_embed_batch() {
        struct Constant;
        impl Embedder for Constant {
            fn dimensions(&self) -> usize {
                2
            }
            fn model_name(&self) -> &str {
                "constant"
            }
            fn embed(&self, _text: &str) -> Result<Vec<f32>> {
                Ok(vec![1.0, 0.0])
            }
        }

        let embeddings = Constant.embed_batch(&["a", "b"]).unwrap();
        assert_eq!(embeddings, vec![vec![1.0, 0.0], vec![1.0, 0.0]]);
    }
}
