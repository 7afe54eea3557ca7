//! Batch indexing and paginated, highlighted full-text search over an embedded Tantivy index.
//!
//! The [`search`] module holds the indexing and query pipeline. [`config`] and [`error`]
//! carry the application layer used by the `docsearch` binary.

pub mod config;
pub mod error;
pub mod search;

pub use error::{AppError, Result};
