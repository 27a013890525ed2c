//! Chat history.
//!
//! The running transcript of completed query/answer round-trips. The loop
//! owns it and lends it to the chain; it only ever grows.

use serde::Serialize;

/// One completed round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exchange {
    /// The query as the user typed it.
    pub query: String,
    /// The answer the chain returned for it.
    pub answer: String,
}

impl Exchange {
    /// Creates an exchange.
    pub fn new(query: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            answer: answer.into(),
        }
    }
}

/// Append-only, ordered sequence of exchanges.
///
/// # Examples
///
/// ```
/// use nyaya_rag::core::ChatHistory;
///
/// let mut history = ChatHistory::new();
/// history.push("What is theft?", "Theft is defined in Section 378.");
/// assert_eq!(history.len(), 1);
/// assert_eq!(history.last().map(|e| e.query.as_str()), Some("What is theft?"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatHistory {
    exchanges: Vec<Exchange>,
}

impl ChatHistory {
    /// Creates an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            exchanges: Vec::new(),
        }
    }

    /// Appends a completed round-trip.
    pub fn push(&mut self, query: impl Into<String>, answer: impl Into<String>) {
        self.exchanges.push(Exchange::new(query, answer));
    }

    /// Number of completed round-trips.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// True before the first round-trip completes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Exchanges in the order they were produced.
    #[must_use]
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Most recent exchange.
    #[must_use]
    pub fn last(&self) -> Option<&Exchange> {
        self.exchanges.last()
    }

    /// Iterates exchanges oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Exchange> {
        self.exchanges.iter()
    }

    /// Renders the transcript as `Human:`/`Assistant:` turns for prompts.
    #[must_use]
    pub fn to_transcript(&self) -> String {
        self.exchanges
            .iter()
            .map(|e| format!("Human: {}\nAssistant: {}", e.query, e.answer))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a ChatHistory {
    type Item = &'a Exchange;
    type IntoIter = std::slice::Iter<'a, Exchange>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
