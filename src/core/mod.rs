//! core
//!
//! Core domain types and configuration.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ResultEvent, DispatchEntry, PageUri, etc.
//! - [`prefixes`] - URI / URL / site prefix conversion
//! - [`config`] - Configuration schema, loading, and alias resolution
//!
//! # Design Principles
//!
//! - Failures are data: every outcome is a [`types::ResultEvent`]
//! - Collaborators are passed in explicitly, never looked up globally

pub mod config;
pub mod prefixes;
pub mod types;
