//! Binary entry point for nyaya-rag.
//!
//! nyaya-rag: retrieval-augmented chat about offence severity.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use clap::Parser;
use nyaya_rag::cli::output::{OutputFormat, format_error};
use nyaya_rag::cli::{Cli, execute};
use std::io;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.format);

    // Logs go to stderr so stdout carries only answers.
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match execute(&cli) {
        Ok(outcome) => {
            debug!(?outcome, "session ended");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let error_output = format_error(&e, format);
            match format {
                // JSON errors go to stdout for programmatic parsing
                OutputFormat::Json => println!("{error_output}"),
                OutputFormat::Text => eprintln!("Error: {error_output}"),
            }
            ExitCode::FAILURE
        }
    }
}
