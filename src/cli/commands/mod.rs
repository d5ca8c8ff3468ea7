//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads configuration and resolves aliases
//! 2. Reads its input (file or stdin)
//! 3. Runs the library operation and streams its events to the reporter
//!
//! # Async Commands
//!
//! Import and lint talk to the network, so their handlers build a tokio
//! runtime and `block_on` the event stream. The other commands are
//! synchronous.

mod completion;
mod config_cmd;
mod import;
mod lint;

pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use import::import;
pub use lint::{lint, lint_schema};

use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use tokio::sync::mpsc;

use super::args::{Command, ConfigAction};
use super::{Context, EXIT_ERRORS};
use crate::core::types::ResultEvent;
use crate::ui::output::{Reporter, Summary};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<ExitCode> {
    match command {
        Command::Import {
            site,
            file,
            yaml,
            publish,
            key,
            concurrency,
        } => import::import(
            ctx,
            import::ImportArgs {
                site,
                file,
                yaml,
                publish,
                key,
                concurrency: concurrency.map(usize::from),
            },
        ),
        Command::Lint { url, concurrency } => {
            lint::lint(ctx, url.as_deref(), concurrency.map(usize::from))
        }
        Command::LintSchema { file } => lint::lint_schema(ctx, file.as_deref()),
        Command::Config { action } => {
            match action {
                ConfigAction::Get { key } => config_cmd::get(&key)?,
                ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value)?,
                ConfigAction::List => config_cmd::list()?,
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Completion { shell } => {
            completion::completion(shell)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Read command input from a file, or stdin when no file is given.
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Print every event from a stream and map the outcome to an exit code.
async fn report_stream(ctx: &Context, mut rx: mpsc::Receiver<ResultEvent>) -> Result<ExitCode> {
    let mut reporter = Reporter::stdout(ctx.format(), ctx.verbosity());
    while let Some(event) = rx.recv().await {
        reporter.report(&event).context("Failed to write output")?;
    }
    let summary = reporter.finish().context("Failed to write output")?;
    Ok(exit_code(&summary))
}

/// Print a finished list of events and map the outcome to an exit code.
fn report_all(ctx: &Context, events: &[ResultEvent]) -> Result<ExitCode> {
    let mut reporter = Reporter::stdout(ctx.format(), ctx.verbosity());
    for event in events {
        reporter.report(event).context("Failed to write output")?;
    }
    let summary = reporter.finish().context("Failed to write output")?;
    Ok(exit_code(&summary))
}

fn exit_code(summary: &Summary) -> ExitCode {
    if summary.has_errors() {
        ExitCode::from(EXIT_ERRORS)
    } else {
        ExitCode::SUCCESS
    }
}
