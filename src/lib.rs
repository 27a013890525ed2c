//! # nyaya-rag
//!
//! Retrieval-augmented chat over a legal corpus.
//!
//! nyaya-rag answers questions about offences and their severity. It
//! splits a statute corpus into chunks, embeds and indexes them in
//! `SQLite`, retrieves the passages closest to each question and has a
//! chat model answer from them, carrying the conversation forward.
//!
//! ## Features
//!
//! - **Splitting**: separator-merging and fixed-window strategies
//! - **`SQLite` Index**: embeddings plus FTS5, optionally persisted and reused
//! - **Retrieval**: semantic, BM25 or hybrid (reciprocal rank fusion)
//! - **Conversational chain**: follow-ups are condensed into standalone questions
//! - **Severity mode**: asks for, and extracts, a 1-10 offence rating

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
// Note: unsafe is needed for memory-mapped I/O (memmap2)
#![warn(unsafe_code)]

pub mod chain;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod core;
pub mod embedding;
pub mod error;
pub mod io;
pub mod llm;
pub mod repl;
pub mod search;
pub mod storage;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{ChatHistory, Chunk, Document, DocumentMetadata, Exchange};

// Re-export storage types
pub use storage::{DEFAULT_PERSIST_DIR, IndexStats, SqliteIndex, Storage};

// Re-export chunking types
pub use chunking::{
    CharacterSplitter, FixedSplitter, SplitConfig, Splitter, available_strategies,
    create_splitter,
};

// Re-export embedding types
#[cfg(feature = "fastembed-embeddings")]
pub use embedding::FastEmbedEmbedder;
pub use embedding::{
    Embedder, EmbedderKind, HashEmbedder, OpenAiEmbedder, cosine_similarity, create_embedder,
};

// Re-export search types
pub use search::{
    DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TOP_K, IndexRetriever, RetrievedChunk, Retriever,
    SearchConfig, SearchMode, SearchResult, open_or_build,
};

// Re-export chat types
pub use chain::{Answer, ChatChain, PromptSet, PromptTemplate, RetrievalChain, extract_severity};
pub use llm::{ChatMessage, ChatModel, OpenAiChatModel, OpenAiClient, Role};

// Re-export session and CLI types
pub use cli::{Cli, OutputFormat};
pub use config::AppConfig;
pub use repl::{LoopOutcome, Session, is_exit_command};
