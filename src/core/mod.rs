//! Core domain types.
//!
//! Documents and chunks describe the corpus; the chat history records the
//! conversation.

pub mod chunk;
pub mod document;
pub mod history;

pub use chunk::Chunk;
pub use document::{Document, DocumentMetadata};
pub use history::{ChatHistory, Exchange};
