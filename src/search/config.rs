//! Search configuration

use crate::search::analysis::Analyzer;
use crate::search::error::{SearchError, SearchResult};
use crate::search::highlight::HighlightStyle;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the writer treats an existing index at the configured location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenMode {
    /// Replace whatever the location holds
    #[default]
    Create,
    /// Add to an existing index; fail if there is none
    Append,
    /// Add to an existing index, creating one if needed
    CreateOrAppend,
}

/// Search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Path to the search index directory
    pub index_path: PathBuf,

    /// Writer buffer size in megabytes, shared by all writer threads (default: 256)
    pub writer_buffer_mb: usize,

    /// Number of engine indexing threads per writer
    pub writer_threads: usize,

    /// How an existing index is treated when a writer opens
    pub open_mode: OpenMode,

    /// Documents added between two commits of a batch
    pub commit_chunk_size: usize,

    /// Page size used when a request asks for fewer than one result
    pub default_page_size: usize,

    /// Fields highlighted on every hit
    pub highlight_fields: Vec<String>,

    /// Marker inserted before a highlighted term
    pub highlight_pre_tag: String,

    /// Marker inserted after a highlighted term
    pub highlight_post_tag: String,

    /// Maximum characters per highlighted fragment
    pub fragment_size: usize,

    /// Analyzer for analyzed-stored fields
    pub analyzer: Analyzer,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("./data/search_index"),
            writer_buffer_mb: 256,
            writer_threads: 1,
            open_mode: OpenMode::Create,
            commit_chunk_size: 500,
            default_page_size: 15,
            highlight_fields: Vec::new(),
            highlight_pre_tag: "<em>".to_string(),
            highlight_post_tag: "</em>".to_string(),
            fragment_size: 150,
            analyzer: Analyzer::Standard,
        }
    }
}

impl SearchConfig {
    /// Writer memory budget in bytes
    pub fn writer_buffer_bytes(&self) -> usize {
        self.writer_buffer_mb.saturating_mul(1024 * 1024)
    }

    pub fn highlight_style(&self) -> HighlightStyle {
        HighlightStyle {
            pre_tag: self.highlight_pre_tag.clone(),
            post_tag: self.highlight_post_tag.clone(),
            fragment_size: self.fragment_size,
        }
    }

    /// Reject settings that would make indexing or pagination meaningless
    pub fn validate(&self) -> SearchResult<()> {
        if self.index_path.as_os_str().is_empty() {
            return Err(SearchError::InvalidConfiguration(
                "index_path must not be empty".to_string(),
            ));
        }
        if self.writer_buffer_mb == 0 {
            return Err(SearchError::InvalidConfiguration(
                "writer_buffer_mb must be at least 1".to_string(),
            ));
        }
        if self.writer_threads == 0 {
            return Err(SearchError::InvalidConfiguration(
                "writer_threads must be at least 1".to_string(),
            ));
        }
        if self.commit_chunk_size == 0 {
            return Err(SearchError::InvalidConfiguration(
                "commit_chunk_size must be at least 1".to_string(),
            ));
        }
        if self.default_page_size == 0 {
            return Err(SearchError::InvalidConfiguration(
                "default_page_size must be at least 1".to_string(),
            ));
        }
        if self.fragment_size == 0 {
            return Err(SearchError::InvalidConfiguration(
                "fragment_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.index_path = path.into();
        self
    }

    pub fn writer_buffer_mb(mut self, megabytes: usize) -> Self {
        self.config.writer_buffer_mb = megabytes;
        self
    }

    pub fn writer_threads(mut self, threads: usize) -> Self {
        self.config.writer_threads = threads;
        self
    }

    pub fn open_mode(mut self, mode: OpenMode) -> Self {
        self.config.open_mode = mode;
        self
    }

    pub fn commit_chunk_size(mut self, size: usize) -> Self {
        self.config.commit_chunk_size = size;
        self
    }

    pub fn default_page_size(mut self, size: usize) -> Self {
        self.config.default_page_size = size;
        self
    }

    pub fn highlight_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.highlight_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn highlight_tags(mut self, pre: impl Into<String>, post: impl Into<String>) -> Self {
        self.config.highlight_pre_tag = pre.into();
        self.config.highlight_post_tag = post.into();
        self
    }

    pub fn fragment_size(mut self, size: usize) -> Self {
        self.config.fragment_size = size;
        self
    }

    pub fn analyzer(mut self, analyzer: Analyzer) -> Self {
        self.config.analyzer = analyzer;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.writer_buffer_mb, 256);
        assert_eq!(config.open_mode, OpenMode::Create);
        assert_eq!(config.commit_chunk_size, 500);
        assert_eq!(config.default_page_size, 15);
        assert_eq!(config.highlight_pre_tag, "<em>");
        assert_eq!(config.highlight_post_tag, "</em>");
        assert_eq!(config.fragment_size, 150);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = SearchConfigBuilder::new()
            .index_path("/tmp/authors")
            .open_mode(OpenMode::Append)
            .commit_chunk_size(100)
            .highlight_fields(["desc"])
            .highlight_tags("[", "]")
            .analyzer(Analyzer::Cjk)
            .build();

        assert_eq!(config.index_path, PathBuf::from("/tmp/authors"));
        assert_eq!(config.open_mode, OpenMode::Append);
        assert_eq!(config.commit_chunk_size, 100);
        assert_eq!(config.highlight_fields, vec!["desc".to_string()]);
        assert_eq!(config.highlight_pre_tag, "[");
        assert_eq!(config.analyzer, Analyzer::Cjk);
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let config = SearchConfigBuilder::new().commit_chunk_size(0).build();
        assert!(matches!(
            config.validate(),
            Err(SearchError::InvalidConfiguration(_))
        ));

        let config = SearchConfigBuilder::new().default_page_size(0).build();
        assert!(config.validate().is_err());

        let config = SearchConfigBuilder::new().writer_threads(0).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_buffer_bytes() {
        let config = SearchConfigBuilder::new().writer_buffer_mb(64).build();
        assert_eq!(config.writer_buffer_bytes(), 64 * 1024 * 1024);
    }
}
