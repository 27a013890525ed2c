//! Text splitting strategies.
//!
//! The corpus is split into retrieval chunks before embedding. Two
//! strategies are available:
//!
//! - **Character**: splits on blank lines and merges pieces up to the chunk size
//! - **Fixed**: fixed-size character windows with optional newline alignment

pub mod character;
pub mod fixed;
pub mod traits;

pub use character::CharacterSplitter;
pub use fixed::FixedSplitter;
pub use traits::{SplitConfig, Splitter};

/// Default chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default overlap in characters.
pub const DEFAULT_OVERLAP: usize = 0;

/// Default separator for [`CharacterSplitter`].
pub const DEFAULT_SEPARATOR: &str = "\n\n";

/// Name of the default strategy.
pub const DEFAULT_STRATEGY: &str = "character";

/// Creates a splitter by name.
///
/// # Errors
///
/// Returns [`crate::error::ChunkingError::UnknownStrategy`] if the strategy name is not recognized.
pub fn create_splitter(name: &str) -> crate::error::Result<Box<dyn Splitter>> {
    match name.to_lowercase().as_str() {
        "character" => Ok(Box::new(CharacterSplitter::new())),
        "fixed" => Ok(Box::new(FixedSplitter::new())),
        _ => Err(crate::error::ChunkingError::UnknownStrategy {
            name: name.to_string(),
        }
        .into()),
    }
}

/// Lists available splitting strategy names.
#[must_use]
pub fn available_strategies() -> Vec<&'static str> {
    vec!["character", "fixed"]
}
