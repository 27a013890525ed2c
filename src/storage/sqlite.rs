//! `SQLite` index implementation.
//!
//! One connection holds documents, chunks, their embeddings and an FTS5
//! mirror kept in sync by triggers.

// SQLite stores all integers as i64. These casts are intentional and safe
// because we only store non-negative values that fit in usize.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

use crate::core::document::current_timestamp;
use crate::core::{Chunk, Document};
use crate::error::{Result, StorageError};
use crate::storage::schema::{
    CHECK_SCHEMA_SQL, CLEAR_SQL, CURRENT_SCHEMA_VERSION, EMBEDDING_MODEL_KEY, GET_INFO_SQL,
    SCHEMA_SQL, SET_INFO_SQL, VERSION_KEY,
};
use crate::storage::traits::{IndexBatch, IndexStats, Storage};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::{Path, PathBuf};
use tracing::debug;

const CHUNK_COLUMNS: &str =
    "id, document_id, content, byte_start, byte_end, chunk_index, strategy, has_overlap";

/// SQLite-backed retrieval index.
///
/// # Examples
///
/// ```
/// use nyaya_rag::storage::{SqliteIndex, Storage};
///
/// let mut index = SqliteIndex::in_memory().unwrap();
/// index.init().unwrap();
/// assert_eq!(index.chunk_count().unwrap(), 0);
/// ```
pub struct SqliteIndex {
    conn: Connection,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteIndex")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteIndex {
    /// Opens or creates an index database at `path`.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Database(e.to_string()))?;
        }

        let conn = Connection::open(&path).map_err(StorageError::from)?;
        conn.execute("PRAGMA foreign_keys = ON;", [])
            .map_err(StorageError::from)?;
        let _: String = conn
            .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
            .map_err(StorageError::from)?;

        debug!(path = %path.display(), "opened index database");
        Ok(Self {
            conn,
            path: Some(path),
        })
    }

    /// Creates an in-memory index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        conn.execute("PRAGMA foreign_keys = ON;", [])
            .map_err(StorageError::from)?;

        Ok(Self { conn, path: None })
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn get_info(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(GET_INFO_SQL, params![key], |row| row.get(0))
            .optional()
            .map_err(StorageError::from)?;
        Ok(value)
    }

    fn set_info(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(SET_INFO_SQL, params![key, value])
            .map_err(StorageError::from)?;
        Ok(())
    }

    fn schema_version(&self) -> Result<Option<u32>> {
        Ok(self.get_info(VERSION_KEY)?.and_then(|v| v.parse().ok()))
    }

    /// Returns the embedding model recorded for this index.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn embedding_model(&self) -> Result<Option<String>> {
        self.get_info(EMBEDDING_MODEL_KEY)
    }

    fn chunk_from_row(row: &Row<'_>) -> rusqlite::Result<Chunk> {
        Ok(Chunk {
            id: Some(row.get(0)?),
            document_id: row.get(1)?,
            content: row.get(2)?,
            byte_range: (row.get::<_, i64>(3)? as usize)..(row.get::<_, i64>(4)? as usize),
            index: row.get::<_, i64>(5)? as usize,
            strategy: row.get(6)?,
            has_overlap: row.get::<_, i64>(7)? != 0,
        })
    }
}

impl Storage for SqliteIndex {
    fn init(&mut self) -> Result<()> {
        if self.is_initialized()? {
            match self.schema_version()? {
                Some(CURRENT_SCHEMA_VERSION) => {}
                Some(version) => {
                    return Err(StorageError::Migration(format!(
                        "index schema version {version} is not supported (expected {CURRENT_SCHEMA_VERSION}); rebuild the index"
                    ))
                    .into());
                }
                None => self.set_info(VERSION_KEY, &CURRENT_SCHEMA_VERSION.to_string())?,
            }
            return Ok(());
        }

        self.conn
            .execute_batch(SCHEMA_SQL)
            .map_err(StorageError::from)?;
        self.set_info(VERSION_KEY, &CURRENT_SCHEMA_VERSION.to_string())?;
        Ok(())
    }

    fn is_initialized(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(CHECK_SCHEMA_SQL, [], |row| row.get(0))
            .map_err(StorageError::from)?;
        Ok(count > 0)
    }

    fn replace_all(&mut self, batch: &mut IndexBatch) -> Result<()> {
        let chunk_count = batch.chunk_count();
        if batch.embeddings.len() != chunk_count {
            return Err(StorageError::Embedding(format!(
                "{} embeddings for {chunk_count} chunks",
                batch.embeddings.len()
            ))
            .into());
        }

        // Dropping the transaction on any error rolls everything back.
        let tx = self.conn.transaction().map_err(StorageError::from)?;
        tx.execute_batch(CLEAR_SQL).map_err(StorageError::from)?;

        let mut chunk_ids = Vec::with_capacity(chunk_count);
        for prepared in &mut batch.documents {
            prepared.document.set_chunk_count(prepared.chunks.len());
            let document_id = insert_document(&tx, &prepared.document)?;
            prepared.document.id = Some(document_id);
            insert_chunks(&tx, document_id, &mut prepared.chunks)?;
            chunk_ids.extend(prepared.chunks.iter().filter_map(|chunk| chunk.id));
        }
        insert_embeddings(&tx, &chunk_ids, &batch.embeddings, &batch.embedding_model)?;
        tx.execute(
            SET_INFO_SQL,
            params![EMBEDDING_MODEL_KEY, batch.embedding_model],
        )
        .map_err(StorageError::from)?;

        tx.commit().map_err(StorageError::from)?;
        debug!(
            documents = batch.documents.len(),
            chunks = chunk_count,
            "replaced index contents"
        );
        Ok(())
    }

    fn get_chunk(&self, id: i64) -> Result<Option<Chunk>> {
        let chunk = self
            .conn
            .query_row(
                &format!("SELECT {CHUNK_COLUMNS} FROM chunks WHERE id = ?"),
                params![id],
                Self::chunk_from_row,
            )
            .optional()
            .map_err(StorageError::from)?;

        Ok(chunk)
    }

    fn chunk_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .map_err(StorageError::from)?;
        Ok(count as usize)
    }

    fn stats(&self) -> Result<IndexStats> {
        let document_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(StorageError::from)?;

        let total_size: i64 = self
            .conn
            .query_row("SELECT COALESCE(SUM(size), 0) FROM documents", [], |row| {
                row.get(0)
            })
            .map_err(StorageError::from)?;

        let db_size = self
            .path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok().map(|m| m.len()));

        Ok(IndexStats {
            document_count: document_count as usize,
            chunk_count: self.chunk_count()?,
            embedded_count: self.embedding_count()?,
            total_content_size: total_size as usize,
            schema_version: self.schema_version()?.unwrap_or(0),
            embedding_model: self.embedding_model()?,
            db_size,
        })
    }
}

// ==================== Write Helpers ====================

fn insert_document(conn: &Connection, document: &Document) -> Result<i64> {
    let source = document
        .source
        .as_ref()
        .map(|p| p.to_string_lossy().to_string());

    conn.execute(
        r"
        INSERT INTO documents (source_path, content, size, line_count, chunk_count, loaded_at)
        VALUES (?, ?, ?, ?, ?, ?)
    ",
        params![
            source,
            document.content,
            document.metadata.size as i64,
            document.metadata.line_count as i64,
            document.metadata.chunk_count.map(|c| c as i64),
            document.metadata.loaded_at,
        ],
    )
    .map_err(StorageError::from)?;

    Ok(conn.last_insert_rowid())
}

fn insert_chunks(conn: &Connection, document_id: i64, chunks: &mut [Chunk]) -> Result<()> {
    let now = current_timestamp();
    let mut stmt = conn
        .prepare(
            r"
            INSERT INTO chunks (
                document_id, content, byte_start, byte_end, chunk_index,
                strategy, has_overlap, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ",
        )
        .map_err(StorageError::from)?;

    for chunk in chunks.iter_mut() {
        stmt.execute(params![
            document_id,
            chunk.content,
            chunk.byte_range.start as i64,
            chunk.byte_range.end as i64,
            chunk.index as i64,
            chunk.strategy,
            i64::from(chunk.has_overlap),
            now,
        ])
        .map_err(StorageError::from)?;
        chunk.id = Some(conn.last_insert_rowid());
        chunk.document_id = document_id;
    }
    Ok(())
}

fn insert_embeddings(
    conn: &Connection,
    chunk_ids: &[i64],
    embeddings: &[Vec<f32>],
    model_name: &str,
) -> Result<()> {
    let now = current_timestamp();
    let mut stmt = conn
        .prepare(
            r"
            INSERT OR REPLACE INTO chunk_embeddings (chunk_id, embedding, dimensions, model_name, created_at)
            VALUES (?, ?, ?, ?, ?)
        ",
        )
        .map_err(StorageError::from)?;

    for (chunk_id, embedding) in chunk_ids.iter().zip(embeddings) {
        let bytes: Vec<u8> = embedding.iter().flat_map(|f| f.to_le_bytes()).collect();
        stmt.execute(params![
            chunk_id,
            bytes,
            embedding.len() as i64,
            model_name,
            now
        ])
        .map_err(StorageError::from)?;
    }
    Ok(())
}

// ==================== Embedding & Search Operations ====================

fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

impl SqliteIndex {
    /// Returns all chunk embeddings, ordered by chunk ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_all_embeddings(&self) -> Result<Vec<(i64, Vec<f32>)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT chunk_id, embedding FROM chunk_embeddings ORDER BY chunk_id")
            .map_err(StorageError::from)?;

        let results = stmt
            .query_map([], |row| {
                let chunk_id: i64 = row.get(0)?;
                let bytes: Vec<u8> = row.get(1)?;
                Ok((chunk_id, decode_embedding(&bytes)))
            })
            .map_err(StorageError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;

        Ok(results)
    }

    /// Counts chunks with embeddings.
    ///
    /// # Errors
    ///
    /// Returns an error if the count fails.
    pub fn embedding_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM chunk_embeddings", [], |row| {
                row.get(0)
            })
            .map_err(StorageError::from)?;
        Ok(count as usize)
    }

    /// Performs FTS5 BM25 full-text search.
    ///
    /// Returns chunk IDs with scores where higher is a better match. Terms
    /// are OR-ed together and quoted so FTS5 operators in user text are
    /// treated as literals.
    ///
    /// # Errors
    ///
    /// Returns an error if the search fails.
    pub fn search_fts(&self, query: &str, limit: usize) -> Result<Vec<(i64, f64)>> {
        let fts_query = query
            .split_whitespace()
            .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
            .collect::<Vec<_>>()
            .join(" OR ");

        if fts_query.is_empty() {
            return Ok(Vec::new());
        }

        // bm25() is negative with more negative meaning better; negate it.
        let mut stmt = self
            .conn
            .prepare(
                r"
                SELECT rowid, -bm25(chunks_fts) as score
                FROM chunks_fts
                WHERE chunks_fts MATCH ?
                ORDER BY score DESC, rowid ASC
                LIMIT ?
            ",
            )
            .map_err(StorageError::from)?;

        let results = stmt
            .query_map(params![fts_query, limit as i64], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?))
            })
            .map_err(StorageError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;

        Ok(results)
    }
}
