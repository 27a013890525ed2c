//! Hash-based lexical embedder.
//!
//! Produces deterministic pseudo-embeddings without a model or network
//! access. Vectors cluster by shared words and character trigrams, not by
//! meaning, which is enough for offline runs and tests.

use crate::Result;
use crate::embedding::Embedder;
use rayon::prelude::*;
use unicode_segmentation::UnicodeSegmentation;

/// Default dimensions for hash embeddings.
pub const HASH_DIMENSIONS: usize = 384;

/// Hash-based embedder.
///
/// Hashing uses FNV-1a so vectors stay identical across builds and a
/// persisted index remains valid.
///
/// # Examples
///
/// ```
/// use nyaya_rag::embedding::{Embedder, HashEmbedder};
///
/// let embedder = HashEmbedder::default();
/// let a = embedder.embed("punishment for theft").unwrap();
/// let b = embedder.embed("punishment for theft").unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(HASH_DIMENSIONS)
    }
}

impl HashEmbedder {
    /// Creates a hash embedder with the given dimensions (at least 1).
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn fnv1a(bytes: &[u8]) -> u64 {
        bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ u64::from(*byte)).wrapping_mul(0x0000_0100_0000_01b3)
        })
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn generate_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        // Words carry the main signal.
        for word in lowered.unicode_words() {
            let hash = Self::fnv1a(word.as_bytes());
            let idx = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            let magnitude = 1.0 + ((hash >> 16) & 0xFF) as f32 / 255.0;
            embedding[idx] += sign * magnitude;
        }

        // Trigrams give partial credit for inflected forms.
        let chars: Vec<char> = lowered
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        for window in chars.windows(3) {
            if window.iter().any(|c| *c == ' ') {
                continue;
            }
            let trigram: String = window.iter().collect();
            let hash = Self::fnv1a(trigram.as_bytes());
            let idx = (hash % self.dimensions as u64) as usize;
            embedding[idx] += if (hash >> 32) & 1 == 0 { 0.5 } else { -0.5 };
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in &mut embedding {
                *val /= magnitude;
            }
        }

        embedding
    }
}

impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        "hash"
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.generate_embedding(text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .par_iter()
            .map(|text| self.generate_embedding(text))
            .collect())
    }
}
