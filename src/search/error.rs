//! Error types for search operations

use std::path::PathBuf;
use tantivy::directory::error::LockError;
use tantivy::TantivyError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while indexing or searching
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A clause could not be turned into an engine query
    #[error("Query composition failed: {0}")]
    QueryComposition(String),

    /// The composed query has no clauses
    #[error("No query clauses were composed; build a non-empty query before searching")]
    MissingQuery,

    /// The highlight allow-list is empty
    #[error("No highlight fields configured; declare at least one highlight field")]
    MissingHighlightFields,

    /// Another session holds the write lock on the index location
    #[error("Index writer busy: another session holds the write lock on {}", path.display())]
    WriterBusy { path: PathBuf },

    /// I/O failure while opening, writing or committing
    #[error("Index write failed: {context}")]
    IndexWrite {
        context: String,
        #[source]
        source: TantivyError,
    },

    /// I/O failure while opening or reading a snapshot
    #[error("Index read failed: {context}")]
    IndexRead {
        context: String,
        #[source]
        source: TantivyError,
    },

    /// A mapped record does not fit the declared schema
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The requested sort key is not a sortable field
    #[error("Invalid sort field: {0}")]
    InvalidSortField(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl SearchError {
    pub(crate) fn write(context: impl Into<String>, source: impl Into<TantivyError>) -> Self {
        SearchError::IndexWrite {
            context: context.into(),
            source: source.into(),
        }
    }

    pub(crate) fn read(context: impl Into<String>, source: impl Into<TantivyError>) -> Self {
        SearchError::IndexRead {
            context: context.into(),
            source: source.into(),
        }
    }

    /// Map a writer-open failure, surfacing lock contention as `WriterBusy`
    pub(crate) fn writer_open(path: PathBuf, source: TantivyError) -> Self {
        match source {
            TantivyError::LockFailure(LockError::LockBusy, _) => SearchError::WriterBusy { path },
            other => SearchError::write(
                format!("failed to open index writer at {}", path.display()),
                other,
            ),
        }
    }

    /// Whether the caller may retry the same call later without changing it
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SearchError::WriterBusy { .. }
                | SearchError::IndexWrite { .. }
                | SearchError::IndexRead { .. }
        )
    }
}

impl From<tantivy::query::QueryParserError> for SearchError {
    fn from(err: tantivy::query::QueryParserError) -> Self {
        SearchError::QueryComposition(err.to_string())
    }
}
