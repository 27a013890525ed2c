//! Corpus loading.
//!
//! The corpus is either a single text file or a directory of them. A
//! directory is walked one level deep and its `.txt` files are loaded in
//! path order.

use crate::core::Document;
use crate::error::{IoError, Result};
use crate::io::read_file;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default corpus location, relative to the working directory.
pub const DEFAULT_CORPUS_PATH: &str = "data/ipc-data.txt";

/// File extension picked up when the corpus is a directory.
const CORPUS_EXTENSION: &str = "txt";

/// Loads the corpus at `path` into documents.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if `path` does not exist,
/// [`IoError::EmptyCorpus`] if a directory has no `.txt` files, or any
/// read error from the files themselves.
///
/// # Examples
///
/// ```no_run
/// use nyaya_rag::io::load_corpus;
///
/// let docs = load_corpus("data/ipc-data.txt").unwrap();
/// assert_eq!(docs.len(), 1);
/// ```
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<Document>> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_string_lossy().to_string(),
        }
        .into());
    }

    if path.is_dir() {
        load_directory(path)
    } else {
        let content = read_file(path)?;
        info!(path = %path.display(), bytes = content.len(), "loaded corpus file");
        Ok(vec![Document::from_file(path.to_path_buf(), content)])
    }
}

fn load_directory(dir: &Path) -> Result<Vec<Document>> {
    let dir_str = dir.to_string_lossy().to_string();

    let entries = std::fs::read_dir(dir).map_err(|e| IoError::DirectoryFailed {
        path: dir_str.clone(),
        reason: e.to_string(),
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == CORPUS_EXTENSION))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(IoError::EmptyCorpus { path: dir_str }.into());
    }

    let mut documents = Vec::with_capacity(files.len());
    for file in files {
        let content = read_file(&file)?;
        debug!(path = %file.display(), bytes = content.len(), "loaded corpus file");
        documents.push(Document::from_file(file, content));
    }

    info!(path = %dir.display(), documents = documents.len(), "loaded corpus directory");
    Ok(documents)
}
