//! Output formatting for answers and errors.
//!
//! Supports text and JSON output formats.

use crate::chain::Answer;
use crate::error::Error;
use crate::search::{RetrievedChunk, SearchMode};
use serde::Serialize;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Answer text only, one per round-trip.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Serialize)]
struct SourceRecord<'a> {
    chunk_id: i64,
    document_id: i64,
    index: usize,
    score: f64,
    mode: SearchMode,
    content: &'a str,
}

impl<'a> From<&'a RetrievedChunk> for SourceRecord<'a> {
    fn from(chunk: &'a RetrievedChunk) -> Self {
        Self {
            chunk_id: chunk.chunk_id,
            document_id: chunk.document_id,
            index: chunk.index,
            score: chunk.score,
            mode: chunk.mode,
            content: &chunk.content,
        }
    }
}

#[derive(Serialize)]
struct AnswerRecord<'a> {
    query: &'a str,
    answer: &'a str,
    standalone_question: &'a str,
    severity: Option<u8>,
    sources: Vec<SourceRecord<'a>>,
}

/// Formats one answered query, newline-terminated.
///
/// Text output is the answer alone so it can be piped; JSON output is a
/// single-line object with the query, standalone question, severity and
/// sources.
#[must_use]
pub fn format_answer(query: &str, answer: &Answer, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = answer.text.clone();
            output.push('\n');
            output
        }
        OutputFormat::Json => {
            let record = AnswerRecord {
                query,
                answer: &answer.text,
                standalone_question: &answer.standalone_question,
                severity: answer.severity(),
                sources: answer.sources.iter().map(SourceRecord::from).collect(),
            };
            let mut line = format_json_line(&record);
            line.push('\n');
            line
        }
    }
}

/// Formats an error for display.
///
/// JSON errors carry a coarse `error` kind so scripts can branch on it.
#[must_use]
pub fn format_error(error: &Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ErrorOutput<'a> {
                error: &'a str,
                message: String,
            }
            format_json_line(&ErrorOutput {
                error: error_kind(error),
                message: error.to_string(),
            })
        }
    }
}

const fn error_kind(error: &Error) -> &'static str {
    match error {
        Error::Io(_) => "io",
        Error::Chunking(_) => "chunking",
        Error::Storage(_) => "storage",
        Error::Search(_) => "search",
        Error::Chat(_) => "chat",
        Error::Prompt(_) => "prompt",
        Error::Config { .. } => "config",
    }
}

fn format_json_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}
