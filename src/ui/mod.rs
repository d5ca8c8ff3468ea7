//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Event rendering, verbosity, run summaries
//!
//! # Design
//!
//! Every line a command prints goes through this module so human and JSON
//! output stay consistent and `--quiet` is honored in one place.

pub mod output;
