//! The interactive read-eval loop.
//!
//! A [`Session`] owns the chain and the chat history. Each iteration reads
//! one query, stops on an exit word or end of input, and otherwise prints
//! the chain's answer and records the round-trip.

use crate::chain::ChatChain;
use crate::cli::output::{OutputFormat, format_answer};
use crate::core::ChatHistory;
use crate::error::Result;
use std::io::{BufRead, Write};
use tracing::{debug, info};

/// Text printed before each interactive read.
pub const PROMPT: &str = "Prompt: ";

/// Queries that end the session. Matched exactly.
pub const EXIT_COMMANDS: [&str; 3] = ["quit", "q", "exit"];

/// True exactly for `quit`, `q` and `exit`; case and whitespace count.
///
/// # Examples
///
/// ```
/// use nyaya_rag::repl::is_exit_command;
///
/// assert!(is_exit_command("quit"));
/// assert!(!is_exit_command("Quit"));
/// assert!(!is_exit_command(" q"));
/// ```
#[must_use]
pub fn is_exit_command(query: &str) -> bool {
    EXIT_COMMANDS.contains(&query)
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The user typed an exit word.
    Exited,
    /// Input closed.
    EndOfInput,
}

/// A conversation: a chain plus the history it has produced.
#[derive(Debug)]
pub struct Session<C> {
    chain: C,
    history: ChatHistory,
    format: OutputFormat,
}

impl<C: ChatChain> Session<C> {
    /// Creates a session with empty history and text output.
    pub const fn new(chain: C) -> Self {
        Self {
            chain,
            history: ChatHistory::new(),
            format: OutputFormat::Text,
        }
    }

    /// Sets the answer output format.
    ///
    /// JSON sessions write one object per answer and no interactive prompt.
    #[must_use]
    pub const fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Completed round-trips so far.
    pub const fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Returns the chain.
    pub const fn chain(&self) -> &C {
        &self.chain
    }

    /// Runs the loop until an exit word or end of input.
    ///
    /// `initial` is used as the first query instead of reading; every later
    /// query comes from `input`.
    ///
    /// # Errors
    ///
    /// Returns the first chain or I/O error. The query that failed is not
    /// added to the history.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        initial: Option<String>,
        input: &mut R,
        output: &mut W,
    ) -> Result<LoopOutcome> {
        let mut pending = initial;

        loop {
            let query = match pending.take() {
                Some(query) => query,
                None => {
                    if self.format == OutputFormat::Text {
                        output.write_all(PROMPT.as_bytes())?;
                        output.flush()?;
                    }
                    match read_query(input)? {
                        Some(query) => query,
                        None => {
                            info!(exchanges = self.history.len(), "end of input");
                            return Ok(LoopOutcome::EndOfInput);
                        }
                    }
                }
            };

            if is_exit_command(&query) {
                info!(exchanges = self.history.len(), "exit requested");
                return Ok(LoopOutcome::Exited);
            }

            debug!(turn = self.history.len() + 1, query = %query, "query");
            let answer = self.chain.answer(&query, &self.history)?;
            output.write_all(format_answer(&query, &answer, self.format).as_bytes())?;
            output.flush()?;
            self.history.push(query, answer.text);
        }
    }
}

/// Reads one line without its trailing `\n` or `\r\n`. `None` at end of input.
fn read_query<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}
