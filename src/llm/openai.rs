//! OpenAI chat-completion model.

use crate::error::{ChatError, Result};
use crate::llm::client::OpenAiClient;
use crate::llm::{ChatMessage, ChatModel, Role};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use tracing::debug;

/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo-1106";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Chat model backed by the OpenAI chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiChatModel {
    client: OpenAiClient,
    model: String,
    temperature: f32,
}

impl OpenAiChatModel {
    /// Creates a chat model using `model` with the default temperature.
    #[must_use]
    pub fn new(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let content = message.content.as_str();
    Ok(match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    })
}

impl ChatModel for OpenAiChatModel {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request_messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages(request_messages)
            .temperature(self.temperature)
            .build()?;

        debug!(model = %self.model, messages = messages.len(), "sending chat completion");
        let response = self
            .client
            .block_on(self.client.inner().chat().create(request))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ChatError::EmptyResponse)?;

        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
