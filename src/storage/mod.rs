//! Index storage.
//!
//! Documents, chunks, embeddings and a full-text mirror live in one
//! `SQLite` database: in memory for a throwaway index, or on disk under the
//! persist directory so later runs can reuse it.

pub mod schema;
pub mod sqlite;
pub mod traits;

pub use schema::CURRENT_SCHEMA_VERSION;
pub use sqlite::SqliteIndex;
pub use traits::{IndexBatch, IndexStats, PreparedDocument, Storage};

use std::path::{Path, PathBuf};

/// Default persist directory, relative to the working directory.
pub const DEFAULT_PERSIST_DIR: &str = "persist";

/// Index database file name inside the persist directory.
pub const INDEX_FILE_NAME: &str = "index.db";

/// Returns the index database path inside `persist_dir`.
#[must_use]
pub fn index_path(persist_dir: &Path) -> PathBuf {
    persist_dir.join(INDEX_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_path() {
        assert_eq!(
            index_path(Path::new(DEFAULT_PERSIST_DIR)),
            PathBuf::from("persist/index.db")
        );
    }
}
