//! Startup wiring and session execution.
//!
//! Builds the index, retriever, chat model and chain from the resolved
//! configuration, then hands control to the read-eval loop.

use crate::chain::{PromptSet, RetrievalChain};
use crate::chunking::create_splitter;
use crate::cli::parser::Cli;
use crate::config::AppConfig;
use crate::embedding::create_embedder;
use crate::error::Result;
use crate::llm::{OpenAiChatModel, OpenAiClient};
use crate::repl::{LoopOutcome, Session};
use crate::search::{IndexOptions, IndexRetriever, open_or_build};
use std::io::{self, BufRead, Write};
use tracing::info;

/// Executes the CLI against the process's stdin and stdout.
///
/// # Errors
///
/// Returns an error if configuration, indexing or any round-trip fails.
pub fn execute(cli: &Cli) -> Result<LoopOutcome> {
    let config = AppConfig::from_cli(cli)?;
    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    run(&config, cli.query.clone(), &mut input, &mut output)
}

/// Builds everything from `config` and runs a session over `input`/`output`.
///
/// The API client is created first so a missing key fails before the
/// corpus is touched; the index is then built or reused before the first
/// query is handled.
///
/// # Errors
///
/// Returns an error if setup fails or the session ends with an error.
pub fn run<R: BufRead, W: Write>(
    config: &AppConfig,
    initial: Option<String>,
    input: &mut R,
    output: &mut W,
) -> Result<LoopOutcome> {
    let client = OpenAiClient::new(config.api_key.as_deref(), config.api_base.as_deref())?;
    let embedder = create_embedder(config.embedder, &config.embedding_model, Some(&client))?;
    let splitter = create_splitter(&config.splitter)?;

    let options = IndexOptions {
        corpus: &config.corpus,
        persist_dir: config.persist_dir.as_deref(),
        rebuild: config.rebuild,
        splitter: splitter.as_ref(),
        split_config: config.split,
    };
    let (index, report) = open_or_build(&options, embedder.as_ref())?;
    info!(
        documents = report.documents,
        chunks = report.chunks,
        embedded = report.embedded,
        reused = report.reused,
        embedder = embedder.model_name(),
        "index ready"
    );

    let retriever = IndexRetriever::new(index, embedder, config.search.clone());
    let model = OpenAiChatModel::new(client, config.chat_model.as_str())
        .with_temperature(config.temperature);
    let chain = RetrievalChain::new(retriever, model)
        .with_prompts(PromptSet::load(config.prompt_dir.as_deref()))
        .with_severity(config.severity);
    info!(
        model = %config.chat_model,
        mode = %config.search.mode,
        top_k = config.search.top_k,
        severity = config.severity,
        "session ready"
    );

    Session::new(chain)
        .with_format(config.format)
        .run(initial, input, output)
}
