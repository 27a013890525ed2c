//! Question answering over retrieved passages.
//!
//! The read-eval loop depends only on [`ChatChain`]; [`RetrievalChain`] is
//! the production implementation built from a retriever and a chat model.

pub mod prompt;
pub mod retrieval;
pub mod severity;

pub use prompt::{
    CONDENSE_QUESTION_TEMPLATE, PromptSet, PromptTemplate, QA_SYSTEM_TEMPLATE, SEVERITY_TEMPLATE,
    format_severity_prompt,
};
pub use retrieval::RetrievalChain;
pub use severity::{MAX_SEVERITY, MIN_SEVERITY, extract_severity};

use crate::core::ChatHistory;
use crate::error::Result;
use crate::search::RetrievedChunk;
use serde::Serialize;

/// The chain's reply to one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    /// Model reply text.
    pub text: String,
    /// Question actually used for retrieval and answering.
    pub standalone_question: String,
    /// Passages the reply was grounded on, best first.
    pub sources: Vec<RetrievedChunk>,
}

impl Answer {
    /// Severity rating found in the reply text, if any.
    #[must_use]
    pub fn severity(&self) -> Option<u8> {
        extract_severity(&self.text)
    }
}

/// Answers a query given the conversation so far.
pub trait ChatChain {
    /// Produces an answer for `query`. `history` holds the completed
    /// round-trips before this one and is not modified.
    ///
    /// # Errors
    ///
    /// Returns an error if retrieval, prompting or the model call fails.
    fn answer(&mut self, query: &str, history: &ChatHistory) -> Result<Answer>;
}
