//! rest
//!
//! Abstraction over the remote content store's REST API.
//!
//! # Architecture
//!
//! The `Rest` trait defines the three capabilities import and lint need:
//! reading a resource, writing a resource, and resolving a public URL to
//! its page. Components receive an `Arc<dyn Rest>` explicitly, so tests
//! substitute [`mock::MockRest`] without touching shared state.
//!
//! - Every failure carries the URL that failed
//! - Nothing retries: a failed request is reported once
//!
//! # Modules
//!
//! - `traits`: Core `Rest` trait and `RestError`
//! - [`http`]: reqwest-backed implementation
//! - [`mock`]: In-memory implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use claywork::rest::{http::HttpRest, Rest};
//!
//! let rest = HttpRest::new();
//! let data = rest.get("http://domain.com/_components/a").await?;
//! rest.put("http://domain.com/_components/a@published", &data, Some("abc")).await?;
//! ```

pub mod http;
pub mod mock;
mod traits;

pub use traits::*;
