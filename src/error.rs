//! Error types for nyaya-rag operations.
//!
//! This module provides the error hierarchy using `thiserror` for corpus
//! loading, splitting, index storage, retrieval, prompting and chat calls.
//! Nothing in the crate recovers from these locally; they surface at the
//! process boundary.

use thiserror::Error;

/// Result type alias for nyaya-rag operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors (corpus files, persist directory).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Text splitting errors.
    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    /// Index storage errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Retrieval errors.
    #[error("search error: {0}")]
    Search(#[from] SearchError),

    /// Chat model errors.
    #[error("chat error: {0}")]
    Chat(#[from] ChatError),

    /// Prompt rendering errors.
    #[error("prompt error: {0}")]
    Prompt(#[from] PromptError),

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

impl Error {
    /// Builds a configuration error from any message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// I/O-specific errors for corpus and index files.
#[derive(Error, Debug)]
pub enum IoError {
    /// File or directory not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Memory mapping error.
    #[error("memory mapping failed: {path}: {reason}")]
    MmapFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Directory creation or listing error.
    #[error("directory error: {path}: {reason}")]
    DirectoryFailed {
        /// Path to the directory.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// A corpus directory held no loadable documents.
    #[error("no documents found in corpus: {path}")]
    EmptyCorpus {
        /// Corpus path.
        path: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// Splitting errors.
#[derive(Error, Debug)]
pub enum ChunkingError {
    /// Invalid splitter configuration.
    #[error("invalid chunk configuration: {reason}")]
    InvalidConfig {
        /// Reason the configuration is invalid.
        reason: String,
    },

    /// Overlap exceeds chunk size.
    #[error("overlap {overlap} must be less than chunk size {size}")]
    OverlapTooLarge {
        /// Overlap size.
        overlap: usize,
        /// Chunk size.
        size: usize,
    },

    /// Unknown splitting strategy.
    #[error("unknown splitting strategy: {name}")]
    UnknownStrategy {
        /// Name of the unknown strategy.
        name: String,
    },
}

/// Index storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(String),

    /// Schema version mismatch.
    #[error("migration error: {0}")]
    Migration(String),

    /// Embedding generation failed while indexing or querying.
    #[error("embedding error: {0}")]
    Embedding(String),
}

/// Retrieval errors.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Unknown search mode name.
    #[error("unknown search mode: {name} (expected semantic, bm25 or hybrid)")]
    UnknownMode {
        /// The rejected mode name.
        name: String,
    },
}

/// Chat model errors.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The remote API rejected or failed the request.
    #[error("API request failed: {0}")]
    Api(String),

    /// The response held no message content.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// The blocking runtime could not be started.
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Prompt rendering errors.
#[derive(Error, Debug)]
pub enum PromptError {
    /// A declared template variable had no value.
    #[error("missing value for template variable: {name}")]
    MissingVariable {
        /// Variable name.
        name: String,
    },
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Database(err.to_string()))
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<async_openai::error::OpenAIError> for ChatError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        Self::Api(err.to_string())
    }
}

impl From<async_openai::error::OpenAIError> for Error {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        Self::Chat(err.into())
    }
}
