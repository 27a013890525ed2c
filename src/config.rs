//! Resolved runtime configuration.

use crate::chunking::SplitConfig;
use crate::cli::Cli;
use crate::cli::output::OutputFormat;
use crate::embedding::EmbedderKind;
use crate::error::Result;
use crate::search::{SearchConfig, SearchMode};
use std::path::PathBuf;

/// Everything needed to start a session, parsed and validated.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Corpus file or directory.
    pub corpus: PathBuf,
    /// Persist directory; `None` keeps the index in memory.
    pub persist_dir: Option<PathBuf>,
    /// Force re-indexing of a persisted index.
    pub rebuild: bool,
    /// Chat model name.
    pub chat_model: String,
    /// Chat sampling temperature.
    pub temperature: f32,
    /// Embedding backend.
    pub embedder: EmbedderKind,
    /// Embedding model for the openai backend.
    pub embedding_model: String,
    /// API key, if any.
    pub api_key: Option<String>,
    /// API base URL override.
    pub api_base: Option<String>,
    /// Retrieval settings.
    pub search: SearchConfig,
    /// Splitting strategy name.
    pub splitter: String,
    /// Splitter limits.
    pub split: SplitConfig,
    /// Wrap queries in the severity template.
    pub severity: bool,
    /// Prompt override directory.
    pub prompt_dir: Option<PathBuf>,
    /// Answer output format.
    pub format: OutputFormat,
}

impl AppConfig {
    /// Builds the configuration from parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown embedder or search mode, or invalid
    /// chunk limits.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let embedder: EmbedderKind = cli.embedder.parse()?;
        let mode: SearchMode = cli.search_mode.parse()?;
        let split = SplitConfig::new(cli.chunk_size, cli.overlap);
        split.validate()?;

        Ok(Self {
            corpus: cli.corpus.clone(),
            persist_dir: cli.persist_dir(),
            rebuild: cli.rebuild,
            chat_model: cli.model.clone(),
            temperature: cli.temperature,
            embedder,
            embedding_model: cli.embedding_model.clone(),
            api_key: cli.api_key.clone(),
            api_base: cli.api_base.clone(),
            search: SearchConfig::new()
                .with_top_k(cli.top_k)
                .with_threshold(cli.threshold)
                .with_mode(mode),
            splitter: cli.splitter.clone(),
            split,
            severity: cli.severity,
            prompt_dir: cli.prompt_dir.clone(),
            format: OutputFormat::parse(&cli.format),
        })
    }
}
