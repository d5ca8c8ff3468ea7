//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Only print warnings and errors
//! - `--json`: Print one JSON object per result event

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// clay - import and lint content on a remote content store
#[derive(Parser, Debug)]
#[command(name = "clay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print one JSON object per result event
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import bootstrap or dispatch data into a site
    #[command(
        name = "import",
        long_about = "Import bootstrap or dispatch data into a site.\n\n\
            Input is read from --file or stdin. By default the input must be dispatch \
            JSON: one or more objects mapping site-relative URIs to payloads. With --yaml \
            the input is bootstrap YAML keyed by _components, _pages, _uris and _lists.\n\n\
            Several files can be piped in at once, either as separate YAML documents or \
            concatenated with `tail -n +1`. Later documents override earlier ones.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Import a bootstrap file into a site alias
    clay import local --file bootstrap.yml --yaml

    # Import dispatches exported from another site
    cat dispatch.json | clay import https://www.example.com --key prod

    # Import and publish everything
    clay import local --file bootstrap.yml --yaml --publish

    # Import a directory of bootstraps
    tail -n +1 bootstraps/*.yml | clay import local --yaml"
    )]
    Import {
        /// Site alias or base URL (defaults to $CLAY_DEFAULT_URL)
        site: Option<String>,

        /// Read input from a file instead of stdin
        #[arg(short, long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Parse input as bootstrap YAML
        #[arg(short, long)]
        yaml: bool,

        /// Also write @published copies of components and pages
        #[arg(short, long)]
        publish: bool,

        /// Key alias or literal write key
        #[arg(short, long)]
        key: Option<String>,

        /// Maximum concurrent writes
        #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
        concurrency: Option<u16>,
    },

    /// Check that everything a component, page, or public URL references exists
    #[command(
        name = "lint",
        long_about = "Check that everything a URL references exists.\n\n\
            The URL may point at a component, a page, or a public URL. Each node is \
            first checked through its composed .json representation; only when that \
            fails are its children checked one by one, so errors point at the nodes \
            that are actually missing.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Lint a page
    clay lint http://domain.com/_pages/index

    # Lint the page served at a public URL
    clay lint https://www.example.com/2024/01/some-article.html

    # Lint a component with fewer concurrent requests
    clay lint domain.com/_components/article/instances/foo --concurrency 2"
    )]
    Lint {
        /// URL or site alias to lint (defaults to $CLAY_DEFAULT_URL)
        url: Option<String>,

        /// Maximum concurrent requests
        #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
        concurrency: Option<u16>,
    },

    /// Check a component schema for common mistakes
    #[command(
        name = "lint-schema",
        after_help = "\
WORKFLOW EXAMPLES:
    # Lint a schema file
    clay lint-schema components/article/schema.yml

    # Lint from stdin
    cat schema.yml | clay lint-schema"
    )]
    LintSchema {
        /// Schema file (defaults to stdin)
        file: Option<PathBuf>,
    },

    /// Get, set, or list configuration values
    #[command(
        name = "config",
        long_about = "View or modify clay configuration.\n\n\
            Configuration is stored in ~/.clay/config.toml (or $CLAY_CONFIG). Keys are \
            url.<alias>, key.<alias> and concurrency.",
        after_help = "\
WORKFLOW EXAMPLES:
    # List all configuration values
    clay config list

    # Add a site alias and its key
    clay config set url.local localhost.example.com
    clay config set key.local abc

    # Get a value
    clay config get url.local"
    )]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash
    clay completion bash > /etc/bash_completion.d/clay

    # Zsh
    clay completion zsh > \"${fpath[1]}/_clay\""
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
