//! Integration tests for nyaya-rag.
//!
//! The chat model is scripted and embeddings are hash-based, so nothing
//! here touches the network.

#![allow(clippy::expect_used)]

use nyaya_rag::chain::{Answer, ChatChain, RetrievalChain};
use nyaya_rag::chunking::{CharacterSplitter, SplitConfig};
use nyaya_rag::core::ChatHistory;
use nyaya_rag::embedding::HashEmbedder;
use nyaya_rag::error::{ChatError, Error, IoError};
use nyaya_rag::llm::{ChatMessage, ChatModel, Role};
use nyaya_rag::repl::{LoopOutcome, Session};
use nyaya_rag::search::{IndexOptions, IndexRetriever, SearchConfig, SearchMode, open_or_build};
use nyaya_rag::{Result, Storage};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Cursor;
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;

const CORPUS: &str = "section_[378] Theft. Whoever, intending to take dishonestly any movable property \
out of the possession of any person without that person's consent, moves that property is said to \
commit theft.\n\n\
section_[379] Punishment for theft. Whoever commits theft shall be punished with imprisonment of \
either description for a term which may extend to three years, or with fine, or with both.\n\n\
section_[302] Punishment for murder. Whoever commits murder shall be punished with death, or \
imprisonment for life, and shall also be liable to fine.\n\n\
section_[323] Punishment for voluntarily causing hurt. Whoever voluntarily causes hurt shall be \
punished with imprisonment which may extend to one year, or with fine.";

/// Replays canned replies and records every request, shared with the test.
#[derive(Clone, Default)]
struct ScriptedModel {
    replies: Rc<RefCell<VecDeque<String>>>,
    requests: Rc<RefCell<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedModel {
    fn with_replies(replies: &[&str]) -> Self {
        let model = Self::default();
        model
            .replies
            .borrow_mut()
            .extend(replies.iter().map(ToString::to_string));
        model
    }
}

impl ChatModel for ScriptedModel {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.requests.borrow_mut().push(messages.to_vec());
        self.replies
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ChatError::Api("no scripted reply left".to_string()).into())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn write_corpus(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("ipc-data.txt");
    std::fs::write(&path, CORPUS).expect("write corpus");
    path
}

fn build_retriever(corpus: &Path, persist: Option<&Path>, config: SearchConfig) -> IndexRetriever {
    let splitter = CharacterSplitter::new();
    let options = IndexOptions {
        corpus,
        persist_dir: persist,
        rebuild: false,
        splitter: &splitter,
        split_config: SplitConfig::new(300, 0),
    };
    let (index, report) = open_or_build(&options, &HashEmbedder::default()).expect("build index");
    assert_eq!(report.chunks, 4);
    IndexRetriever::new(index, Box::new(HashEmbedder::default()), config)
}

fn run_session(
    chain: RetrievalChain<IndexRetriever, ScriptedModel>,
    initial: Option<&str>,
    input: &str,
) -> (Session<RetrievalChain<IndexRetriever, ScriptedModel>>, Result<LoopOutcome>, String) {
    let mut session = Session::new(chain);
    let mut reader = Cursor::new(input.as_bytes().to_vec());
    let mut output = Vec::new();
    let outcome = session.run(initial.map(str::to_string), &mut reader, &mut output);
    (
        session,
        outcome,
        String::from_utf8(output).expect("utf-8 output"),
    )
}

#[test]
fn test_first_question_then_quit() {
    let temp = TempDir::new().expect("temp dir");
    let corpus = write_corpus(temp.path());
    let model = ScriptedModel::with_replies(&["Theft is punishable with up to three years."]);
    let chain = RetrievalChain::new(
        build_retriever(&corpus, None, SearchConfig::default()),
        model.clone(),
    );

    let (session, outcome, output) =
        run_session(chain, Some("What is the punishment for theft?"), "quit\n");

    assert_eq!(outcome.expect("session"), LoopOutcome::Exited);
    assert_eq!(session.history().len(), 1);
    assert_eq!(
        output,
        "Theft is punishable with up to three years.\nPrompt: "
    );

    let requests = model.requests.borrow();
    assert_eq!(requests.len(), 1, "no condense call on the first turn");
    let system = &requests[0][0];
    assert_eq!(system.role, Role::System);
    assert!(system.content.contains("section_[379] Punishment for theft."));
    assert_eq!(
        requests[0][1],
        ChatMessage::user("What is the punishment for theft?")
    );
}

#[test]
fn test_follow_up_uses_history() {
    let temp = TempDir::new().expect("temp dir");
    let corpus = write_corpus(temp.path());
    let model = ScriptedModel::with_replies(&[
        "Up to three years, or fine, or both.",
        "What is the punishment for murder?",
        "Death or imprisonment for life.",
    ]);
    let chain = RetrievalChain::new(
        build_retriever(&corpus, None, SearchConfig::default()),
        model.clone(),
    );

    let (session, outcome, _) = run_session(
        chain,
        Some("What is the punishment for theft?"),
        "And for murder?\nexit\n",
    );

    assert_eq!(outcome.expect("session"), LoopOutcome::Exited);
    let history: Vec<&str> = session.history().iter().map(|e| e.query.as_str()).collect();
    assert_eq!(
        history,
        vec!["What is the punishment for theft?", "And for murder?"]
    );

    let requests = model.requests.borrow();
    assert_eq!(requests.len(), 3);
    let condense = &requests[1][0].content;
    assert!(condense.contains("Human: What is the punishment for theft?"));
    assert!(condense.contains("Assistant: Up to three years, or fine, or both."));
    assert!(condense.contains("Follow Up Input: And for murder?"));
    assert_eq!(requests[2][1].content, "What is the punishment for murder?");
    assert!(requests[2][0].content.contains("section_[302]"));
}

#[test]
fn test_chain_failure_terminates_without_recording() {
    let temp = TempDir::new().expect("temp dir");
    let corpus = write_corpus(temp.path());
    let model = ScriptedModel::with_replies(&["Section 378 defines theft."]);
    let chain = RetrievalChain::new(
        build_retriever(&corpus, None, SearchConfig::default()),
        model,
    );

    let (session, outcome, _) = run_session(chain, Some("What is theft?"), "And hurt?\n");

    let err = outcome.expect_err("second turn has no reply");
    assert!(matches!(err, Error::Chat(ChatError::Api(_))));
    assert_eq!(session.history().len(), 1);
}

#[test]
fn test_severity_mode_end_to_end() {
    let temp = TempDir::new().expect("temp dir");
    let corpus = write_corpus(temp.path());
    let model = ScriptedModel::with_replies(&[
        "Murder carries death or life imprisonment. Severity of the case out of 1-10:- 10",
    ]);
    let mut chain = RetrievalChain::new(
        build_retriever(&corpus, None, SearchConfig::new().with_mode(SearchMode::Hybrid)),
        model.clone(),
    )
    .with_severity(true);

    let answer: Answer = chain
        .answer("A man killed his neighbour.", &ChatHistory::new())
        .expect("answer");
    assert_eq!(answer.severity(), Some(10));
    assert_eq!(answer.standalone_question, "A man killed his neighbour.");
    assert_eq!(answer.sources.len(), 2);
    assert!(answer.sources.iter().all(|s| s.mode == SearchMode::Hybrid));

    let requests = model.requests.borrow();
    let user = &requests[0][1].content;
    assert!(user.starts_with("You are a law enforcing crime evaluater."));
    assert!(user.ends_with("A man killed his neighbour."));
}

#[test]
fn test_severity_mode_retrieves_like_plain_mode() {
    let temp = TempDir::new().expect("temp dir");
    let corpus = write_corpus(temp.path());
    let description = "He committed murder of his neighbour";

    let mut plain = RetrievalChain::new(
        build_retriever(&corpus, None, SearchConfig::default()),
        ScriptedModel::with_replies(&["Death or imprisonment for life."]),
    );
    let mut severity = RetrievalChain::new(
        build_retriever(&corpus, None, SearchConfig::default()),
        ScriptedModel::with_replies(&["Severity of the case out of 1-10:- 10"]),
    )
    .with_severity(true);

    let plain_answer = plain
        .answer(description, &ChatHistory::new())
        .expect("plain answer");
    let severity_answer = severity
        .answer(description, &ChatHistory::new())
        .expect("severity answer");

    let ids = |answer: &Answer| answer.sources.iter().map(|s| s.chunk_id).collect::<Vec<_>>();
    assert_eq!(ids(&plain_answer), ids(&severity_answer));
    assert!(
        severity_answer
            .sources
            .iter()
            .any(|s| s.content.contains("section_[302]"))
    );
}

#[test]
fn test_end_of_input_is_clean_exit() {
    let temp = TempDir::new().expect("temp dir");
    let corpus = write_corpus(temp.path());
    let chain = RetrievalChain::new(
        build_retriever(&corpus, None, SearchConfig::default()),
        ScriptedModel::default(),
    );

    let (session, outcome, output) = run_session(chain, None, "");
    assert_eq!(outcome.expect("session"), LoopOutcome::EndOfInput);
    assert!(session.history().is_empty());
    assert_eq!(output, "Prompt: ");
}

#[test]
fn test_persisted_index_survives_restart() {
    let temp = TempDir::new().expect("temp dir");
    let corpus = write_corpus(temp.path());
    let persist = temp.path().join("persist");

    let first = build_retriever(&corpus, Some(persist.as_path()), SearchConfig::default());
    let chunks_before = first.index().chunk_count().expect("chunk count");
    drop(first);

    // A second start must not need the corpus.
    std::fs::remove_file(&corpus).expect("remove corpus");
    let second = build_retriever(&corpus, Some(persist.as_path()), SearchConfig::default());
    assert_eq!(
        second.index().chunk_count().expect("chunk count"),
        chunks_before
    );
}

#[test]
fn test_missing_corpus_is_startup_error() {
    let temp = TempDir::new().expect("temp dir");
    let splitter = CharacterSplitter::new();
    let options = IndexOptions {
        corpus: &temp.path().join("absent.txt"),
        persist_dir: None,
        rebuild: false,
        splitter: &splitter,
        split_config: SplitConfig::new(1000, 0),
    };

    let result = open_or_build(&options, &HashEmbedder::default());
    assert!(matches!(
        result,
        Err(Error::Io(IoError::FileNotFound { .. }))
    ));
}
