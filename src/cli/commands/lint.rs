//! lint commands - Check reference graphs and schema documents

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::{read_input, report_all, report_stream};
use crate::cli::Context;
use crate::core::config::Config;
use crate::lint;
use crate::rest::http::HttpRest;

/// Lint everything reachable from a URL or site alias.
pub fn lint(ctx: &Context, url: Option<&str>, concurrency: Option<usize>) -> Result<ExitCode> {
    let config = Config::load().context("Failed to load config")?;
    let url = config.resolve_url(url);
    let concurrency = concurrency.unwrap_or_else(|| config.concurrency());
    tracing::debug!(url = ?url, concurrency, "linting");

    let rest = Arc::new(HttpRest::new());
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let rx = lint::lint_url(rest, url.as_deref(), concurrency);
        report_stream(ctx, rx).await
    })
}

/// Lint a schema document from a file or stdin.
pub fn lint_schema(ctx: &Context, file: Option<&Path>) -> Result<ExitCode> {
    let text = read_input(file)?;
    report_all(ctx, &lint::lint_schema(&text))
}
