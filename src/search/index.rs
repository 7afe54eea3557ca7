//! Index location helpers and statistics

use crate::search::analysis::register_analyzers;
use crate::search::config::SearchConfig;
use crate::search::error::{SearchError, SearchResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tantivy::schema::Schema;
use tantivy::{Index, IndexReader, ReloadPolicy, TantivyError};

/// Index statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Committed documents visible to a new snapshot
    pub total_documents: u64,

    /// Index size in bytes
    pub index_size_bytes: u64,

    /// Number of segments
    pub num_segments: usize,

    /// Opstamp of the last commit
    pub opstamp: u64,
}

/// Check if an index has been committed at the given path
pub fn index_exists(path: &Path) -> bool {
    path.join("meta.json").exists()
}

/// Fail when the stored schema differs from the declared one
pub(crate) fn ensure_schema(index: &Index, expected: &Schema) -> tantivy::Result<()> {
    if index.schema() != *expected {
        return Err(TantivyError::SchemaError(
            "stored index schema does not match the declared fields".to_string(),
        ));
    }
    Ok(())
}

/// A read-only view of the last commit at the moment it was opened
pub(crate) struct Snapshot {
    pub reader: IndexReader,
}

impl Snapshot {
    pub fn open(config: &SearchConfig, expected: &Schema) -> SearchResult<Self> {
        let path = &config.index_path;
        let context = || format!("failed to open index snapshot at {}", path.display());

        let index = Index::open_in_dir(path).map_err(|e| SearchError::read(context(), e))?;
        ensure_schema(&index, expected).map_err(|e| SearchError::read(context(), e))?;
        register_analyzers(index.tokenizers()).map_err(|e| SearchError::read(context(), e))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::read(context(), e))?;

        Ok(Self { reader })
    }
}

/// Statistics of the committed index at the configured location
pub fn index_stats(config: &SearchConfig) -> SearchResult<IndexStats> {
    let path = &config.index_path;
    let index = Index::open_in_dir(path).map_err(|e| {
        SearchError::read(format!("failed to open index at {}", path.display()), e)
    })?;
    let reader: IndexReader = index
        .reader_builder()
        .reload_policy(ReloadPolicy::Manual)
        .try_into()
        .map_err(|e| SearchError::read("failed to create reader", e))?;
    let searcher = reader.searcher();

    let opstamp = index
        .load_metas()
        .map_err(|e| SearchError::read("failed to load index metadata", e))?
        .opstamp;

    // Calculate approximate index size
    let index_size_bytes = std::fs::read_dir(path)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.metadata().ok())
                .map(|m| m.len())
                .sum()
        })
        .unwrap_or(0);

    Ok(IndexStats {
        total_documents: searcher.num_docs(),
        index_size_bytes,
        num_segments: searcher.segment_readers().len(),
        opstamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::analysis::Analyzer;
    use crate::search::document::IndexSchema;
    use crate::search::error::SearchError;
    use tempfile::TempDir;

    #[test]
    fn test_index_exists_requires_meta() {
        let temp_dir = TempDir::new().unwrap();
        assert!(!index_exists(temp_dir.path()));

        let schema = IndexSchema::new("id").to_engine_schema(Analyzer::Standard);
        Index::create_in_dir(temp_dir.path(), schema).unwrap();
        assert!(index_exists(temp_dir.path()));
    }

    #[test]
    fn test_stats_of_empty_index() {
        let temp_dir = TempDir::new().unwrap();
        let schema = IndexSchema::new("id").to_engine_schema(Analyzer::Standard);
        Index::create_in_dir(temp_dir.path(), schema).unwrap();

        let config = SearchConfig {
            index_path: temp_dir.path().to_path_buf(),
            ..Default::default()
        };
        let stats = index_stats(&config).unwrap();
        assert_eq!(stats.total_documents, 0);
        assert_eq!(stats.num_segments, 0);
        assert!(stats.index_size_bytes > 0);
    }

    #[test]
    fn test_snapshot_rejects_schema_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let stored = IndexSchema::new("id").to_engine_schema(Analyzer::Standard);
        Index::create_in_dir(temp_dir.path(), stored).unwrap();

        let config = SearchConfig {
            index_path: temp_dir.path().to_path_buf(),
            ..Default::default()
        };
        let expected = IndexSchema::new("id")
            .analyzed("desc")
            .to_engine_schema(Analyzer::Standard);
        assert!(matches!(
            Snapshot::open(&config, &expected),
            Err(SearchError::IndexRead { .. })
        ));
    }

    #[test]
    fn test_snapshot_of_missing_index_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = SearchConfig {
            index_path: temp_dir.path().join("absent"),
            ..Default::default()
        };
        let expected = IndexSchema::new("id").to_engine_schema(Analyzer::Standard);
        assert!(matches!(
            Snapshot::open(&config, &expected),
            Err(SearchError::IndexRead { .. })
        ));
    }
}
