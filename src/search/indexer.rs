//! Index construction and reuse.
//!
//! Builds the chunk index from the corpus, or reopens a persisted one.

use crate::chunking::{SplitConfig, Splitter};
use crate::core::{Chunk, Document};
use crate::embedding::Embedder;
use crate::error::Result;
use crate::io::load_corpus;
use crate::storage::{IndexBatch, PreparedDocument, SqliteIndex, Storage, index_path};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Summary of an index build or reuse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Documents in the index.
    pub documents: usize,
    /// Chunks in the index.
    pub chunks: usize,
    /// Chunks with an embedding.
    pub embedded: usize,
    /// Whether an existing persisted index was reused.
    pub reused: bool,
}

/// Where the index comes from and how it is built.
#[derive(Clone, Copy)]
pub struct IndexOptions<'a> {
    /// Corpus file or directory.
    pub corpus: &'a Path,
    /// Persist directory; `None` keeps the index in memory.
    pub persist_dir: Option<&'a Path>,
    /// Rebuild even if a persisted index exists.
    pub rebuild: bool,
    /// Splitting strategy.
    pub splitter: &'a dyn Splitter,
    /// Splitter limits.
    pub split_config: SplitConfig,
}

/// Splits and embeds `documents`, then replaces the contents of `index`.
///
/// Documents are split in parallel and every chunk is embedded before the
/// index is written, so a failure leaves the previous contents in place.
/// The write itself is a single transaction; chunk IDs follow the corpus.
///
/// # Errors
///
/// Returns an error if splitting, embedding or storage fails.
pub fn index_documents(
    index: &mut SqliteIndex,
    documents: Vec<Document>,
    splitter: &dyn Splitter,
    split_config: &SplitConfig,
    embedder: &dyn Embedder,
) -> Result<IndexReport> {
    let splits: Vec<Vec<Chunk>> = documents
        .par_iter()
        .map(|doc| splitter.split(0, &doc.content, split_config))
        .collect::<Result<_>>()?;

    let documents: Vec<PreparedDocument> = documents
        .into_iter()
        .zip(splits)
        .map(|(document, chunks)| {
            info!(
                document = %document.name(),
                chunks = chunks.len(),
                splitter = splitter.name(),
                "split document"
            );
            PreparedDocument { document, chunks }
        })
        .collect();

    let mut batch = IndexBatch {
        documents,
        embeddings: Vec::new(),
        embedding_model: embedder.model_name().to_string(),
    };

    let texts: Vec<&str> = batch
        .documents
        .iter()
        .flat_map(|d| d.chunks.iter().map(|c| c.content.as_str()))
        .collect();
    if texts.is_empty() {
        warn!("corpus produced no chunks; retrieval will return nothing");
    } else {
        batch.embeddings = embedder.embed_batch(&texts)?;
    }

    index.replace_all(&mut batch)?;

    let report = IndexReport {
        documents: batch.documents.len(),
        chunks: batch.chunk_count(),
        embedded: batch.embeddings.len(),
        reused: false,
    };
    info!(
        documents = report.documents,
        chunks = report.chunks,
        embedded = report.embedded,
        model = embedder.model_name(),
        "index built"
    );
    Ok(report)
}

/// Opens the persisted index if it can be reused, otherwise builds one.
///
/// A persisted index is reused when it holds chunks, `rebuild` is off and
/// it was built with the same embedding model; the corpus is then not read.
/// When building, the corpus is loaded and embedded before anything on
/// disk is replaced.
///
/// # Errors
///
/// Returns an error if the corpus is missing or unreadable, or if storage
/// or embedding fails.
pub fn open_or_build(
    options: &IndexOptions<'_>,
    embedder: &dyn Embedder,
) -> Result<(SqliteIndex, IndexReport)> {
    options.split_config.validate()?;

    let mut index = match options.persist_dir {
        Some(dir) => SqliteIndex::open(index_path(dir))?,
        None => SqliteIndex::in_memory()?,
    };
    index.init()?;

    if options.persist_dir.is_some() && !options.rebuild {
        let stats = index.stats()?;
        if stats.chunk_count > 0 {
            if stats.embedding_model.as_deref() == Some(embedder.model_name()) {
                info!(
                    path = ?index.path(),
                    chunks = stats.chunk_count,
                    "Reusing index..."
                );
                let report = IndexReport {
                    documents: stats.document_count,
                    chunks: stats.chunk_count,
                    embedded: stats.embedded_count,
                    reused: true,
                };
                return Ok((index, report));
            }
            warn!(
                stored = ?stats.embedding_model,
                current = embedder.model_name(),
                "persisted index was built with a different embedder; rebuilding"
            );
        }
    }

    let documents = load_corpus(options.corpus)?;
    let report = index_documents(
        &mut index,
        documents,
        options.splitter,
        &options.split_config,
        embedder,
    )?;
    Ok((index, report))
}
