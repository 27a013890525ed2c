//! Chat model abstraction.
//!
//! The retrieval chain talks to a [`ChatModel`]; [`OpenAiChatModel`] is the
//! production implementation and tests script their own.

pub mod client;
pub mod openai;

pub use client::OpenAiClient;
pub use openai::{DEFAULT_CHAT_MODEL, DEFAULT_TEMPERATURE, OpenAiChatModel};

use crate::Result;
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model.
    System,
    /// The person asking.
    User,
    /// The model's earlier replies.
    Assistant,
}

/// A single message in a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A chat-completion model.
///
/// Calls block until the full reply is available.
pub trait ChatModel {
    /// Sends `messages` and returns the model's reply text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ChatError`] on API failure or an empty reply.
    fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Returns the model identifier.
    fn model_name(&self) -> &str;
}
