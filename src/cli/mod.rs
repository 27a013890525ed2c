//! CLI layer for nyaya-rag.
//!
//! Parses arguments with clap, wires the retrieval pipeline together and
//! formats what the session prints.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::{execute, run};
pub use output::OutputFormat;
pub use parser::Cli;
