//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Result events are the only thing written to stdout, one per line (plus
//! indented details in human mode). With `--json` every event is a JSON
//! object on its own line. `--quiet` drops success lines but never warnings
//! or errors. Summaries and diagnostics go to stderr.

use std::fmt::Display;
use std::io::{self, Write};

use crate::core::types::{EventKind, ResultEvent};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - only warnings and errors
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// How events are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Symbol-prefixed lines
    #[default]
    Human,
    /// One JSON object per line
    Json,
}

/// Per-kind event counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub successes: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl Summary {
    /// Count one event.
    pub fn record(&mut self, event: &ResultEvent) {
        match event.kind {
            EventKind::Success => self.successes += 1,
            EventKind::Warning => self.warnings += 1,
            EventKind::Error => self.errors += 1,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} succeeded, {} {}, {} {}",
            self.successes,
            self.warnings,
            plural(self.warnings, "warning", "warnings"),
            self.errors,
            plural(self.errors, "error", "errors"),
        )
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

/// Render one event, or `None` when it is suppressed.
pub fn render(event: &ResultEvent, format: Format, verbosity: Verbosity) -> Option<String> {
    if verbosity == Verbosity::Quiet && event.kind == EventKind::Success {
        return None;
    }

    match format {
        Format::Json => serde_json::to_string(event).ok(),
        Format::Human => {
            let symbol = match event.kind {
                EventKind::Success => "✔",
                EventKind::Warning => "!",
                EventKind::Error => "✖",
            };
            let mut line = format!("{} {}", symbol, event.message);
            if let Some(details) = event.details.as_deref().filter(|d| !d.is_empty()) {
                for detail in details.lines() {
                    line.push_str("\n    ");
                    line.push_str(detail);
                }
            }
            Some(line)
        }
    }
}

/// Writes events as they arrive and keeps a summary.
#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    format: Format,
    verbosity: Verbosity,
    summary: Summary,
}

impl Reporter<io::Stdout> {
    /// A reporter writing to stdout.
    pub fn stdout(format: Format, verbosity: Verbosity) -> Self {
        Self::new(io::stdout(), format, verbosity)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, format: Format, verbosity: Verbosity) -> Self {
        Self {
            out,
            format,
            verbosity,
            summary: Summary::default(),
        }
    }

    /// Count and print one event.
    pub fn report(&mut self, event: &ResultEvent) -> io::Result<()> {
        self.summary.record(event);
        if let Some(line) = render(event, self.format, self.verbosity) {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    /// Flush and print the summary to stderr (human mode, unless quiet).
    pub fn finish(mut self) -> io::Result<Summary> {
        self.out.flush()?;
        if self.format == Format::Human && self.verbosity != Verbosity::Quiet {
            eprintln!("{}", self.summary);
        }
        Ok(self.summary)
    }

    pub fn summary(&self) -> Summary {
        self.summary
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}
