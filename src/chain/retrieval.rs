//! Conversational retrieval chain.

use super::prompt::PromptSet;
use super::{Answer, ChatChain};
use crate::core::ChatHistory;
use crate::error::Result;
use crate::llm::{ChatMessage, ChatModel};
use crate::search::{RetrievedChunk, Retriever};
use tracing::{debug, info};

/// Condense, retrieve, then answer from the retrieved passages.
///
/// With history present the model first rewrites the query into a
/// standalone question; retrieval and answering both use that question.
/// In severity mode only the final user message is rendered through the
/// severity template, so condensing and retrieval see the offence itself.
#[derive(Debug)]
pub struct RetrievalChain<R, M> {
    retriever: R,
    model: M,
    prompts: PromptSet,
    severity: bool,
}

impl<R: Retriever, M: ChatModel> RetrievalChain<R, M> {
    /// Creates a chain with the compiled-in prompts and severity mode off.
    pub fn new(retriever: R, model: M) -> Self {
        Self {
            retriever,
            model,
            prompts: PromptSet::defaults(),
            severity: false,
        }
    }

    /// Replaces the prompt templates.
    #[must_use]
    pub fn with_prompts(mut self, prompts: PromptSet) -> Self {
        self.prompts = prompts;
        self
    }

    /// Renders the answering message through the severity template.
    #[must_use]
    pub const fn with_severity(mut self, severity: bool) -> Self {
        self.severity = severity;
        self
    }

    /// Returns the retriever.
    pub const fn retriever(&self) -> &R {
        &self.retriever
    }

    /// Returns the chat model.
    pub const fn model(&self) -> &M {
        &self.model
    }

    fn condense(&self, question: &str, history: &ChatHistory) -> Result<String> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let transcript = history.to_transcript();
        let prompt = self.prompts.condense.format(&[
            ("chat_history", transcript.as_str()),
            ("question", question),
        ])?;
        debug!(prompt = %prompt, "condensing follow-up");

        let standalone = self.model.complete(&[ChatMessage::user(prompt)])?;
        Ok(standalone.trim().to_string())
    }

    fn respond(&self, question: &str, sources: &[RetrievedChunk]) -> Result<String> {
        let user = if self.severity {
            self.prompts.severity.format(&[("message", question)])?
        } else {
            question.to_string()
        };
        let context = sources
            .iter()
            .map(|chunk| chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let system = self.prompts.qa.format(&[("context", context.as_str())])?;
        debug!(system = %system, "answering");

        self.model
            .complete(&[ChatMessage::system(system), ChatMessage::user(user)])
    }
}

impl<R: Retriever, M: ChatModel> ChatChain for RetrievalChain<R, M> {
    fn answer(&mut self, query: &str, history: &ChatHistory) -> Result<Answer> {
        let standalone_question = self.condense(query, history)?;
        let sources = self.retriever.retrieve(&standalone_question)?;
        info!(
            history = history.len(),
            sources = sources.len(),
            model = self.model.model_name(),
            severity = self.severity,
            "answering query"
        );

        let text = self.respond(&standalone_question, &sources)?;
        Ok(Answer {
            text,
            standalone_question,
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::chain::prompt::{PromptTemplate, format_severity_prompt};
    use crate::error::ChatError;
    use crate::llm::Role;
    use crate::search::SearchMode;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct FixedRetriever {
        passages: Vec<&'static str>,
        seen: RefCell<Vec<String>>,
    }

    impl FixedRetriever {
        fn new(passages: Vec<&'static str>) -> Self {
            Self {
                passages,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Retriever for FixedRetriever {
        fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>> {
            self.seen.borrow_mut().push(query.to_string());
            Ok(self
                .passages
                .iter()
                .enumerate()
                .map(|(i, text)| RetrievedChunk {
                    chunk_id: i64::try_from(i).unwrap() + 1,
                    document_id: 1,
                    index: i,
                    content: (*text).to_string(),
                    score: 1.0,
                    mode: SearchMode::Semantic,
                })
                .collect())
        }
    }

    struct ScriptedModel {
        replies: RefCell<VecDeque<String>>,
        calls: RefCell<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedModel {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: RefCell::new(replies.iter().map(ToString::to_string).collect()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChatModel for ScriptedModel {
        fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
            self.calls.borrow_mut().push(messages.to_vec());
            self.replies
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| ChatError::EmptyResponse.into())
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn test_first_query_skips_condense() {
        let retriever = FixedRetriever::new(vec!["section_[378] Theft.", "section_[379] Punishment."]);
        let model = ScriptedModel::new(&["Up to three years."]);
        let mut chain = RetrievalChain::new(retriever, model);

        let answer = chain
            .answer("What is the punishment for theft?", &ChatHistory::new())
            .unwrap();
        assert_eq!(answer.text, "Up to three years.");
        assert_eq!(answer.standalone_question, "What is the punishment for theft?");
        assert_eq!(answer.sources.len(), 2);

        let calls = chain.model().calls.borrow();
        assert_eq!(calls.len(), 1);
        let messages = &calls[0];
        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.ends_with(
            "----------------\nsection_[378] Theft.\n\nsection_[379] Punishment."
        ));
        assert_eq!(messages[1], ChatMessage::user("What is the punishment for theft?"));
    }

    #[test]
    fn test_follow_up_is_condensed() {
        let retriever = FixedRetriever::new(vec!["section_[379] Punishment."]);
        let model = ScriptedModel::new(&["  What is the fine for theft?\n", "A fine may be imposed."]);
        let mut chain = RetrievalChain::new(retriever, model);

        let mut history = ChatHistory::new();
        history.push("What is theft?", "Section 378.");

        let answer = chain.answer("And the fine?", &history).unwrap();
        assert_eq!(answer.standalone_question, "What is the fine for theft?");
        assert_eq!(answer.text, "A fine may be imposed.");
        assert_eq!(
            chain.retriever().seen.borrow().as_slice(),
            ["What is the fine for theft?"]
        );

        let calls = chain.model().calls.borrow();
        assert_eq!(calls.len(), 2);
        let condense = &calls[0][0];
        assert_eq!(condense.role, Role::User);
        assert!(condense.content.contains(
            "Chat History:\nHuman: What is theft?\nAssistant: Section 378.\nFollow Up Input: And the fine?"
        ));
        assert_eq!(calls[1][1].content, "What is the fine for theft?");
    }

    #[test]
    fn test_severity_mode_wraps_only_answer_message() {
        let retriever = FixedRetriever::new(vec!["section_[302] Murder."]);
        let model = ScriptedModel::new(&["Severity of the case out of 1-10:- 10"]);
        let mut chain = RetrievalChain::new(retriever, model).with_severity(true);

        let answer = chain.answer("He killed a man.", &ChatHistory::new()).unwrap();
        assert_eq!(answer.standalone_question, "He killed a man.");
        assert_eq!(answer.severity(), Some(10));
        assert_eq!(chain.retriever().seen.borrow().as_slice(), ["He killed a man."]);

        let calls = chain.model().calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][1].content, format_severity_prompt("He killed a man."));
    }

    #[test]
    fn test_severity_follow_up_condenses_raw_query() {
        let retriever = FixedRetriever::new(vec!["section_[379] Punishment for theft."]);
        let model = ScriptedModel::new(&[
            "He stole a bicycle from a locked shed at night.",
            "Severity of the case out of 1-10:- 4",
        ]);
        let mut chain = RetrievalChain::new(retriever, model).with_severity(true);

        let mut history = ChatHistory::new();
        history.push("He stole a bicycle.", "Severity of the case out of 1-10:- 3");

        let answer = chain
            .answer("It was from a locked shed at night.", &history)
            .unwrap();
        assert_eq!(
            answer.standalone_question,
            "He stole a bicycle from a locked shed at night."
        );
        assert_eq!(answer.severity(), Some(4));
        assert_eq!(
            chain.retriever().seen.borrow().as_slice(),
            ["He stole a bicycle from a locked shed at night."]
        );

        let calls = chain.model().calls.borrow();
        let condense = &calls[0][0].content;
        assert!(condense.contains("Follow Up Input: It was from a locked shed at night."));
        assert!(!condense.contains("crime evaluater"));
        assert_eq!(
            calls[1][1].content,
            format_severity_prompt("He stole a bicycle from a locked shed at night.")
        );
    }

    #[test]
    fn test_custom_prompts() {
        let prompts = PromptSet {
            qa: PromptTemplate::new("Passages: {context}"),
            ..PromptSet::defaults()
        };
        let retriever = FixedRetriever::new(vec!["one", "two"]);
        let model = ScriptedModel::new(&["ok"]);
        let mut chain = RetrievalChain::new(retriever, model).with_prompts(prompts);

        chain.answer("q", &ChatHistory::new()).unwrap();
        assert_eq!(chain.model().calls.borrow()[0][0].content, "Passages: one\n\ntwo");
    }

    #[test]
    fn test_model_failure_propagates() {
        let retriever = FixedRetriever::new(vec![]);
        let model = ScriptedModel::new(&[]);
        let mut chain = RetrievalChain::new(retriever, model);

        let err = chain.answer("q", &ChatHistory::new()).unwrap_err();
        assert!(matches!(err, Error::Chat(ChatError::EmptyResponse)));
    }
}
