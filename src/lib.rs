//! claywork - import and lint content graphs on a remote content store
//!
//! A site stores components, pages, public URL aliases and lists behind a
//! REST API. This crate moves seed data into a site (import) and checks that
//! everything a page or component references actually exists (lint).
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to handlers)
//! - [`core`] - Domain types, URL/URI helpers, configuration
//! - [`rest`] - Abstraction over the site's REST API, with HTTP and mock backends
//! - [`import`] - Bootstrap/dispatch parsing and bounded-concurrency writes
//! - [`lint`] - Reference graph validation and schema checks
//! - [`ui`] - Output rendering
//!
//! # Result Events
//!
//! Import and lint never fail as a whole once started. Every outcome, good
//! or bad, is a [`core::types::ResultEvent`] delivered over a channel, so a
//! single missing component or failed write never hides the rest.

pub mod cli;
pub mod core;
pub mod import;
pub mod lint;
pub mod rest;
pub mod ui;
