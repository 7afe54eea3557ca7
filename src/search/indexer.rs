//! Batch ingestion of domain records

use crate::search::config::SearchConfig;
use crate::search::document::{DocumentMapper, FieldSet, IndexSchema};
use crate::search::error::SearchResult;
use crate::search::writer::{IndexWriterSession, PreparedDocument};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Outcome of one batch call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    /// Documents written
    pub documents: usize,

    /// Commits issued
    pub chunks: usize,
}

/// Progress emitted after each chunk commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkCommit {
    /// 1-based chunk ordinal within the batch
    pub chunk: usize,

    /// Documents in this chunk
    pub documents: usize,

    /// Documents committed so far in this batch
    pub committed: usize,

    /// Engine opstamp of the commit
    pub opstamp: u64,
}

/// Indexes records of type `T` through a [`DocumentMapper`].
///
/// Every call acquires its own [`IndexWriterSession`] and releases it before returning,
/// whether the call succeeds or fails.
pub struct BatchIndexer<T, M> {
    config: SearchConfig,
    schema: IndexSchema,
    mapper: M,
    _record: PhantomData<fn(&T)>,
}

impl<T, M> BatchIndexer<T, M>
where
    M: DocumentMapper<T>,
{
    pub fn new(config: SearchConfig, mapper: M) -> SearchResult<Self> {
        config.validate()?;
        let schema = mapper.schema();
        schema.validate()?;
        Ok(Self {
            config,
            schema,
            mapper,
            _record: PhantomData,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn schema(&self) -> &IndexSchema {
        &self.schema
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Index records in commit chunks of `commit_chunk_size`
    pub fn index_multi(&self, records: &[T]) -> SearchResult<IndexReport> {
        self.index_multi_with_progress(records, |_| {})
    }

    /// Index records in commit chunks, calling `on_commit` after each chunk is durable.
    ///
    /// Chunks commit in submission order. If a chunk fails, its uncommitted writes are
    /// rolled back; earlier chunks stay committed.
    pub fn index_multi_with_progress<F>(
        &self,
        records: &[T],
        mut on_commit: F,
    ) -> SearchResult<IndexReport>
    where
        F: FnMut(&ChunkCommit),
    {
        if records.is_empty() {
            return Ok(IndexReport::default());
        }

        let mut session = IndexWriterSession::new(self.config.clone(), self.schema.clone())?;
        let documents = records
            .iter()
            .map(|record| session.prepare(&self.mapper.to_fields(record)))
            .collect::<SearchResult<Vec<_>>>()?;

        let outcome = self.write_chunks(&mut session, documents, &mut on_commit);
        finish(session, outcome)
    }

    fn write_chunks<F>(
        &self,
        session: &mut IndexWriterSession,
        documents: Vec<PreparedDocument>,
        on_commit: &mut F,
    ) -> SearchResult<IndexReport>
    where
        F: FnMut(&ChunkCommit),
    {
        let chunk_size = self.config.commit_chunk_size;
        let mut report = IndexReport::default();
        let mut remaining = documents.into_iter().peekable();

        while remaining.peek().is_some() {
            let chunk: Vec<PreparedDocument> = remaining.by_ref().take(chunk_size).collect();
            let added = session.add_documents(chunk)?;
            let opstamp = session.commit()?;

            report.documents += added;
            report.chunks += 1;
            let progress = ChunkCommit {
                chunk: report.chunks,
                documents: added,
                committed: report.documents,
                opstamp,
            };
            tracing::debug!(
                chunk = progress.chunk,
                documents = progress.documents,
                committed = progress.committed,
                "Committed index chunk"
            );
            on_commit(&progress);
        }

        tracing::info!(
            documents = report.documents,
            chunks = report.chunks,
            "Batch indexing complete"
        );
        Ok(report)
    }

    /// Index one record and commit immediately
    pub fn index_single(&self, record: &T) -> SearchResult<()> {
        let mut session = IndexWriterSession::new(self.config.clone(), self.schema.clone())?;
        let document = session.prepare(&self.mapper.to_fields(record))?;
        let outcome = session
            .add_documents(vec![document])
            .and_then(|_| session.commit())
            .map(|_| ());
        finish(session, outcome)
    }

    /// Delete documents by id and commit
    pub fn delete_by_ids<S: AsRef<str>>(&self, ids: &[S]) -> SearchResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let mut session = IndexWriterSession::new(self.config.clone(), self.schema.clone())?;
        let outcome = session
            .delete_ids(ids)
            .and_then(|deleted| session.commit().map(|_| deleted));
        finish(session, outcome)
    }
}

/// Release the session; a release failure never hides an earlier error
fn finish<R>(mut session: IndexWriterSession, outcome: SearchResult<R>) -> SearchResult<R> {
    if outcome.is_err() {
        if let Err(e) = session.rollback() {
            tracing::warn!(error = %e, "Failed to roll back after indexing error");
        }
    }
    match (outcome, session.release()) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(release_err)) => Err(release_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(release_err)) => {
            tracing::warn!(error = %release_err, "Failed to release index writer after error");
            Err(err)
        }
    }
}

/// Maps records with a closure, for callers that do not need a dedicated mapper type
pub struct FnMapper<F> {
    schema: IndexSchema,
    map: F,
}

impl<F> FnMapper<F> {
    pub fn new(schema: IndexSchema, map: F) -> Self {
        Self { schema, map }
    }
}

impl<T, F> DocumentMapper<T> for FnMapper<F>
where
    F: Fn(&T) -> FieldSet,
{
    fn schema(&self) -> IndexSchema {
        self.schema.clone()
    }

    fn to_fields(&self, record: &T) -> FieldSet {
        (self.map)(record)
    }
}
