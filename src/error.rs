use crate::search::SearchError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Indexing and search errors
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl AppError {
    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Search(SearchError::WriterBusy { .. }) => "WRITER_BUSY",
            AppError::Search(SearchError::QueryComposition(_))
            | AppError::Search(SearchError::MissingQuery)
            | AppError::Search(SearchError::InvalidSortField(_)) => "INVALID_QUERY",
            AppError::Search(SearchError::MissingHighlightFields)
            | AppError::Search(SearchError::InvalidConfiguration(_)) => "CONFIGURATION_ERROR",
            AppError::Search(SearchError::InvalidDocument(_)) => "INVALID_DOCUMENT",
            AppError::Search(SearchError::IndexWrite { .. }) => "INDEX_WRITE_ERROR",
            AppError::Search(SearchError::IndexRead { .. }) => "INDEX_READ_ERROR",
        }
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Configuration(_) | AppError::Validation(_) => 2,
            AppError::Search(SearchError::WriterBusy { .. }) => 75,
            _ => 1,
        }
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Validation("test".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            AppError::from(SearchError::MissingQuery).error_code(),
            "INVALID_QUERY"
        );
        assert_eq!(
            AppError::from(SearchError::WriterBusy {
                path: PathBuf::from("/tmp/idx")
            })
            .error_code(),
            "WRITER_BUSY"
        );
    }

    #[test]
    fn test_search_errors_keep_their_message() {
        let err = AppError::from(SearchError::InvalidSortField("desc".to_string()));
        assert_eq!(err.to_string(), "Invalid sort field: desc");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_serde_json_conversion() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
