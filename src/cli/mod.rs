//! cli
//!
//! Command-line interface layer for clay.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and resolve aliases
//! - Delegate to command handlers and map their outcome to an exit code
//!
//! # Exit Codes
//!
//! - `0`: every event was a success or warning
//! - `1`: at least one error event was reported
//! - `2`: the command itself failed (unreadable input, bad config)

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::process::ExitCode;

use anyhow::Result;

use crate::ui::output::{Format, Verbosity};

/// Exit code when an error event was reported.
pub const EXIT_ERRORS: u8 = 1;

/// Exit code when the command could not run.
pub const EXIT_FAILURE: u8 = 2;

/// Flags shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct Context {
    /// Enable debug output
    pub debug: bool,
    /// Only print warnings and errors
    pub quiet: bool,
    /// Print events as JSON lines
    pub json: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    pub fn format(&self) -> Format {
        if self.json {
            Format::Json
        } else {
            Format::Human
        }
    }
}

/// Run the CLI application with already-parsed arguments.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<ExitCode> {
    let ctx = Context {
        debug: cli.debug,
        quiet: cli.quiet,
        json: cli.json,
    };

    commands::dispatch(cli.command, &ctx)
}
