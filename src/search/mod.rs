//! Retrieval over the chunk index.
//!
//! Three modes are available: semantic (cosine similarity over stored
//! embeddings), BM25 (FTS5) and hybrid, which fuses both rankings with
//! Reciprocal Rank Fusion.

pub mod indexer;
pub mod retriever;
mod rrf;

pub use indexer::{IndexOptions, IndexReport, index_documents, open_or_build};
pub use retriever::{IndexRetriever, RetrievedChunk, Retriever};
pub use rrf::{DEFAULT_RRF_K, RrfConfig, reciprocal_rank_fusion};

use crate::core::Chunk;
use crate::embedding::{Embedder, cosine_similarity};
use crate::error::{Error, Result, SearchError};
use crate::storage::{SqliteIndex, Storage};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Default number of chunks handed to the chat model.
pub const DEFAULT_TOP_K: usize = 2;

/// Default minimum similarity; `0.0` disables the filter.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.0;

/// Retrieval strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Cosine similarity over embeddings.
    #[default]
    Semantic,
    /// FTS5 BM25 ranking.
    Bm25,
    /// RRF fusion of semantic and BM25.
    Hybrid,
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "semantic" => Ok(Self::Semantic),
            "bm25" => Ok(Self::Bm25),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(SearchError::UnknownMode {
                name: s.to_string(),
            }
            .into()),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Semantic => write!(f, "semantic"),
            Self::Bm25 => write!(f, "bm25"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Search result with the matched chunk and its scores.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Chunk ID.
    pub chunk_id: i64,
    /// The matched chunk, as stored.
    pub chunk: Chunk,
    /// Ranking score (higher is better). Cosine similarity, BM25 or RRF
    /// depending on the mode.
    pub score: f64,
    /// Semantic similarity (if computed).
    pub semantic_score: Option<f32>,
    /// BM25 score (if computed).
    pub bm25_score: Option<f64>,
}

impl SearchResult {
    /// Builds a result, loading the chunk. `None` if the chunk is gone.
    fn from_chunk_id(
        index: &SqliteIndex,
        chunk_id: i64,
        score: f64,
        semantic_score: Option<f32>,
        bm25_score: Option<f64>,
    ) -> Result<Option<Self>> {
        Ok(index.get_chunk(chunk_id)?.map(|chunk| Self {
            chunk_id,
            chunk,
            score,
            semantic_score,
            bm25_score,
        }))
    }
}

/// Retrieval configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Maximum number of results to return.
    pub top_k: usize,
    /// Minimum cosine similarity for semantic results (`0.0` disables).
    pub similarity_threshold: f32,
    /// RRF k parameter.
    pub rrf_k: u32,
    /// Retrieval strategy.
    pub mode: SearchMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            rrf_k: DEFAULT_RRF_K,
            mode: SearchMode::default(),
        }
    }
}

impl SearchConfig {
    /// Creates a search config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the top-k limit.
    #[must_use]
    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets the similarity threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Sets the retrieval mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Runs the search selected by `config.mode`.
///
/// # Errors
///
/// Returns an error if embedding the query or querying the index fails.
pub fn search(
    index: &SqliteIndex,
    embedder: &dyn Embedder,
    query: &str,
    config: &SearchConfig,
) -> Result<Vec<SearchResult>> {
    match config.mode {
        SearchMode::Semantic => {
            search_semantic(index, embedder, query, config.top_k, config.similarity_threshold)
        }
        SearchMode::Bm25 => search_bm25(index, query, config.top_k),
        SearchMode::Hybrid => hybrid_search(index, embedder, query, config),
    }
}

/// Scores every stored embedding against the query, best first.
///
/// Equal scores keep chunk order. The query is not embedded when the index
/// holds no embeddings.
fn semantic_ranking(
    index: &SqliteIndex,
    embedder: &dyn Embedder,
    query: &str,
    threshold: f32,
) -> Result<Vec<(i64, f32)>> {
    let all_embeddings = index.get_all_embeddings()?;
    if all_embeddings.is_empty() {
        return Ok(Vec::new());
    }

    let query_embedding = embedder.embed(query)?;

    let mut similarities: Vec<(i64, f32)> = all_embeddings
        .par_iter()
        .map(|(chunk_id, embedding)| (*chunk_id, cosine_similarity(&query_embedding, embedding)))
        .collect();

    if threshold > 0.0 {
        similarities.retain(|(_, sim)| *sim >= threshold);
    }

    // sort_by is stable, so ties stay in chunk order.
    similarities.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(similarities)
}

/// Performs semantic-only search.
///
/// # Errors
///
/// Returns an error if search fails.
pub fn search_semantic(
    index: &SqliteIndex,
    embedder: &dyn Embedder,
    query: &str,
    top_k: usize,
    threshold: f32,
) -> Result<Vec<SearchResult>> {
    let ranking = semantic_ranking(index, embedder, query, threshold)?;
    debug!(candidates = ranking.len(), top_k, "semantic search");

    let mut results = Vec::with_capacity(top_k.min(ranking.len()));
    for (chunk_id, score) in ranking.into_iter().take(top_k) {
        if let Some(result) =
            SearchResult::from_chunk_id(index, chunk_id, f64::from(score), Some(score), None)?
        {
            results.push(result);
        }
    }
    Ok(results)
}

/// Performs BM25-only search.
///
/// # Errors
///
/// Returns an error if search fails.
pub fn search_bm25(index: &SqliteIndex, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
    let ranking = index.search_fts(query, top_k)?;
    debug!(candidates = ranking.len(), top_k, "bm25 search");

    let mut results = Vec::with_capacity(ranking.len());
    for (chunk_id, score) in ranking {
        if let Some(result) = SearchResult::from_chunk_id(index, chunk_id, score, None, Some(score))? {
            results.push(result);
        }
    }
    Ok(results)
}

/// Performs hybrid search combining semantic and BM25 rankings with RRF.
///
/// Each ranking contributes up to `2 * top_k` candidates.
///
/// # Errors
///
/// Returns an error if search operations fail.
pub fn hybrid_search(
    index: &SqliteIndex,
    embedder: &dyn Embedder,
    query: &str,
    config: &SearchConfig,
) -> Result<Vec<SearchResult>> {
    let candidates = config.top_k.saturating_mul(2);

    let mut semantic_results =
        semantic_ranking(index, embedder, query, config.similarity_threshold)?;
    semantic_results.truncate(candidates);
    let bm25_results = index.search_fts(query, candidates)?;

    let semantic_ranked: Vec<i64> = semantic_results.iter().map(|(id, _)| *id).collect();
    let bm25_ranked: Vec<i64> = bm25_results.iter().map(|(id, _)| *id).collect();
    let fused = reciprocal_rank_fusion(
        &[&semantic_ranked, &bm25_ranked],
        &RrfConfig::new(config.rrf_k),
    );
    debug!(
        semantic = semantic_ranked.len(),
        bm25 = bm25_ranked.len(),
        fused = fused.len(),
        "hybrid search"
    );

    let semantic_map: HashMap<i64, f32> = semantic_results.into_iter().collect();
    let bm25_map: HashMap<i64, f64> = bm25_results.into_iter().collect();

    let mut results = Vec::with_capacity(config.top_k);
    for (chunk_id, rrf_score) in fused.into_iter().take(config.top_k) {
        if let Some(result) = SearchResult::from_chunk_id(
            index,
            chunk_id,
            rrf_score,
            semantic_map.get(&chunk_id).copied(),
            bm25_map.get(&chunk_id).copied(),
        )? {
            results.push(result);
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::{CharacterSplitter, SplitConfig};
    use crate::core::Document;
    use crate::embedding::HashEmbedder;
    use test_case::test_case;

    fn build_index() -> SqliteIndex {
        let mut index = SqliteIndex::in_memory().unwrap();
        index.init().unwrap();
        let doc = Document::from_content(
            [
                "section_[378] Whoever intending to take dishonestly any movable property commits theft.",
                "section_[302] Whoever commits murder shall be punished with death or imprisonment for life.",
                "section_[499] Whoever by words makes any imputation commits defamation.",
            ]
            .join("\n\n"),
        );
        index_documents(
            &mut index,
            vec![doc],
            &CharacterSplitter::new(),
            &SplitConfig::new(100, 0),
            &HashEmbedder::default(),
        )
        .unwrap();
        index
    }

    #[test_case("semantic", SearchMode::Semantic)]
    #[test_case("BM25", SearchMode::Bm25)]
    #[test_case("hybrid", SearchMode::Hybrid)]
    fn test_parse_mode(name: &str, expected: SearchMode) {
        assert_eq!(name.parse::<SearchMode>().unwrap(), expected);
        assert_eq!(expected.to_string(), name.to_lowercase());
    }

    #[test]
    fn test_parse_unknown_mode() {
        assert!(matches!(
            "vector".parse::<SearchMode>(),
            Err(Error::Search(SearchError::UnknownMode { .. }))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.top_k, 2);
        assert_eq!(config.mode, SearchMode::Semantic);
        assert_eq!(config.rrf_k, 60);
    }

    #[test]
    fn test_semantic_finds_matching_section() {
        let index = build_index();
        let results =
            search_semantic(&index, &HashEmbedder::default(), "punishment for murder", 1, 0.0)
                .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.index, 1);
        assert!(results[0].chunk.content.starts_with("section_[302]"));
        assert_eq!(results[0].chunk.id, Some(results[0].chunk_id));
        assert!(results[0].semantic_score.is_some());
    }

    #[test]
    fn test_semantic_respects_top_k_and_order() {
        let index = build_index();
        let results =
            search_semantic(&index, &HashEmbedder::default(), "whoever commits", 3, 0.0).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_threshold_filters() {
        let index = build_index();
        let results =
            search_semantic(&index, &HashEmbedder::default(), "murder", 3, 0.999).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_bm25() {
        let index = build_index();
        let results = search_bm25(&index, "defamation", 2).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.index, 2);
        assert!(results[0].chunk.content.contains("defamation"));
        assert!(results[0].bm25_score.is_some());
    }

    #[test]
    fn test_hybrid() {
        let index = build_index();
        let config = SearchConfig::new().with_mode(SearchMode::Hybrid).with_top_k(2);
        let results = search(&index, &HashEmbedder::default(), "theft movable property", &config)
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.index, 0);
        assert!(results[0].bm25_score.is_some());
        assert!(results[0].semantic_score.is_some());
    }

    #[test]
    fn test_empty_index() {
        let mut index = SqliteIndex::in_memory().unwrap();
        index.init().unwrap();
        let results = search(
            &index,
            &HashEmbedder::default(),
            "anything",
            &SearchConfig::default(),
        )
        .unwrap();
        assert!(results.is_empty());
    }
}
