//! Corpus I/O.
//!
//! File reading with memory mapping for large statute dumps, directory
//! loading, and character-offset helpers used by the splitters.

pub mod loader;
pub mod reader;
pub mod unicode;

pub use loader::{DEFAULT_CORPUS_PATH, load_corpus};
pub use reader::{FileReader, read_file};
pub use unicode::{byte_offset_of_char, truncate_chars};
