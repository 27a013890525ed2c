//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros. Every option has a
//! default; most can also come from the environment.

use crate::chunking::{DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP, DEFAULT_STRATEGY};
use crate::embedding::DEFAULT_EMBEDDING_MODEL;
use crate::io::DEFAULT_CORPUS_PATH;
use crate::llm::{DEFAULT_CHAT_MODEL, DEFAULT_TEMPERATURE};
use crate::search::{DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TOP_K};
use crate::storage::DEFAULT_PERSIST_DIR;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// nyaya-rag: ask questions about offences and their severity.
///
/// Retrieves passages from a legal corpus (by default the Indian Penal
/// Code) and answers with a chat model, keeping the conversation history
/// for follow-ups. Type `quit`, `q` or `exit` to leave.
#[derive(Parser, Debug)]
#[command(name = "nyaya-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// First query; later queries are read interactively.
    pub query: Option<String>,

    /// Corpus file, or a directory of `.txt` files.
    #[arg(long, env = "NYAYA_CORPUS", default_value = DEFAULT_CORPUS_PATH)]
    pub corpus: PathBuf,

    /// Keep the index on disk and reuse it on later runs.
    #[arg(long, env = "NYAYA_PERSIST", action = ArgAction::SetTrue)]
    pub persist: bool,

    /// Directory holding the persisted index.
    #[arg(long, default_value = DEFAULT_PERSIST_DIR)]
    pub persist_dir: PathBuf,

    /// Rebuild the persisted index even if one exists.
    #[arg(long)]
    pub rebuild: bool,

    /// Chat model name.
    #[arg(long, env = "NYAYA_CHAT_MODEL", default_value = DEFAULT_CHAT_MODEL)]
    pub model: String,

    /// Sampling temperature for the chat model.
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Embedding backend (openai, hash, fastembed).
    #[arg(long, default_value = "openai")]
    pub embedder: String,

    /// Embedding model name for the openai backend.
    #[arg(long, default_value = DEFAULT_EMBEDDING_MODEL)]
    pub embedding_model: String,

    /// API key for the chat and embedding endpoints.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long, env = "OPENAI_API_BASE")]
    pub api_base: Option<String>,

    /// Number of passages retrieved per query.
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Retrieval mode (semantic, bm25, hybrid).
    #[arg(long, default_value = "semantic")]
    pub search_mode: String,

    /// Minimum cosine similarity for semantic results (0 disables).
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    pub threshold: f32,

    /// Splitting strategy (character, fixed).
    #[arg(long, default_value = DEFAULT_STRATEGY)]
    pub splitter: String,

    /// Maximum chunk size in characters.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks.
    #[arg(long, default_value_t = DEFAULT_OVERLAP)]
    pub overlap: usize,

    /// Ask for a 1-10 severity rating of each described offence.
    #[arg(long)]
    pub severity: bool,

    /// Directory with prompt overrides (severity.md, condense.md, qa.md).
    #[arg(long, env = "NYAYA_PROMPT_DIR")]
    pub prompt_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Output format (text, json).
    #[arg(long, default_value = "text")]
    pub format: String,
}

impl Cli {
    /// Persist directory when persistence is on.
    #[must_use]
    pub fn persist_dir(&self) -> Option<PathBuf> {
        self.persist.then(|| self.persist_dir.clone())
    }

    /// Default log filter for the verbosity level.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
