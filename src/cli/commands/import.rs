//! import command - Import bootstrap or dispatch data into a site

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::{read_input, report_stream};
use crate::cli::Context;
use crate::core::config::Config;
use crate::import::{self as pipeline, ImportOptions, InputFormat};
use crate::rest::http::HttpRest;

/// Arguments for the import command.
#[derive(Debug, Clone, Default)]
pub struct ImportArgs {
    pub site: Option<String>,
    pub file: Option<PathBuf>,
    pub yaml: bool,
    pub publish: bool,
    pub key: Option<String>,
    pub concurrency: Option<usize>,
}

/// Import from a file or stdin into the resolved site.
pub fn import(ctx: &Context, args: ImportArgs) -> Result<ExitCode> {
    let config = Config::load().context("Failed to load config")?;
    let site = args.site.as_deref();
    let prefix = config.resolve_url(site);

    let key = match args.key.as_deref() {
        Some(key) => config.resolve_key(Some(key)),
        None => config
            .key_for_site(site)
            .or_else(|| config.resolve_key(None)),
    };

    let options = ImportOptions {
        format: if args.yaml {
            InputFormat::Bootstrap
        } else {
            InputFormat::Dispatch
        },
        publish: args.publish,
        key,
        concurrency: args.concurrency.unwrap_or_else(|| config.concurrency()),
    };

    // no site: report the missing URL without reading stdin
    let text = match prefix {
        Some(_) => read_input(args.file.as_deref())?,
        None => String::new(),
    };

    tracing::debug!(
        prefix = ?prefix,
        format = ?options.format,
        publish = options.publish,
        concurrency = options.concurrency,
        has_key = options.key.is_some(),
        "importing"
    );

    let rest = Arc::new(HttpRest::new());
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let rx = pipeline::import(rest, &text, prefix.as_deref(), options);
        report_stream(ctx, rx).await
    })
}
