//! Write handle lifecycle
//!
//! An [`IndexWriterSession`] starts closed and opens the engine writer on the first
//! write. While open it holds the engine's exclusive write lock for the index
//! location; a second session on the same location fails with
//! [`SearchError::WriterBusy`] instead of waiting. [`IndexWriterSession::release`]
//! returns it to the closed state; dropping an open session releases the lock too.

use crate::search::analysis::register_analyzers;
use crate::search::config::{OpenMode, SearchConfig};
use crate::search::document::{engine_field, FieldSet, IndexSchema};
use crate::search::error::{SearchError, SearchResult};
use crate::search::index::{ensure_schema, index_exists};
use std::path::Path;
use tantivy::schema::{Field, Schema};
use tantivy::{Index, IndexWriter, Opstamp, TantivyDocument, Term};

/// A document converted for the engine, keyed by its id
#[derive(Debug)]
pub struct PreparedDocument {
    pub id: String,
    doc: TantivyDocument,
}

struct OpenWriter {
    writer: IndexWriter,
    id_field: Field,
    pending: usize,
}

enum SessionState {
    Closed,
    Open(Box<OpenWriter>),
}

/// Owns one write handle on an index location
pub struct IndexWriterSession {
    config: SearchConfig,
    schema: IndexSchema,
    engine_schema: Schema,
    state: SessionState,
}

impl IndexWriterSession {
    /// Create a closed session; nothing touches the index until the first write
    pub fn new(config: SearchConfig, schema: IndexSchema) -> SearchResult<Self> {
        config.validate()?;
        schema.validate()?;
        let engine_schema = schema.to_engine_schema(config.analyzer);
        Ok(Self {
            config,
            schema,
            engine_schema,
            state: SessionState::Closed,
        })
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open(_))
    }

    /// Documents added since the last commit
    pub fn pending(&self) -> usize {
        match &self.state {
            SessionState::Open(open) => open.pending,
            SessionState::Closed => 0,
        }
    }

    /// Validate and convert a field set without touching the index
    pub fn prepare(&self, fields: &FieldSet) -> SearchResult<PreparedDocument> {
        let (id, doc) = fields.to_engine_document(&self.schema, &self.engine_schema)?;
        Ok(PreparedDocument { id, doc })
    }

    fn open(&self) -> SearchResult<OpenWriter> {
        let path = &self.config.index_path;
        let context = || format!("failed to open index at {}", path.display());
        let mut exists = index_exists(path);

        if self.config.open_mode == OpenMode::Create && exists {
            exists = !self.discard_if_schema_changed(path)?;
        }
        if self.config.open_mode != OpenMode::Append {
            std::fs::create_dir_all(path).map_err(|e| SearchError::write(context(), e))?;
        }

        let index = match (self.config.open_mode, exists) {
            (OpenMode::Append, _) | (_, true) => Index::open_in_dir(path),
            (_, false) => Index::create_in_dir(path, self.engine_schema.clone()),
        }
        .map_err(|e| SearchError::write(context(), e))?;

        ensure_schema(&index, &self.engine_schema).map_err(|e| SearchError::write(context(), e))?;
        register_analyzers(index.tokenizers()).map_err(|e| SearchError::write(context(), e))?;

        let writer: IndexWriter = index
            .writer_with_num_threads(self.config.writer_threads, self.config.writer_buffer_bytes())
            .map_err(|e| SearchError::writer_open(path.clone(), e))?;

        if self.config.open_mode == OpenMode::Create && exists {
            // Becomes visible with the first commit
            writer
                .delete_all_documents()
                .map_err(|e| SearchError::write("failed to clear existing index", e))?;
        }

        let id_field = engine_field(&self.engine_schema, self.schema.id_field())
            .map_err(SearchError::InvalidConfiguration)?;

        tracing::info!(
            path = %path.display(),
            mode = ?self.config.open_mode,
            buffer_mb = self.config.writer_buffer_mb,
            "Opened index writer"
        );

        Ok(OpenWriter {
            writer,
            id_field,
            pending: 0,
        })
    }

    /// Remove an existing index whose stored schema differs from the declared one.
    ///
    /// The write lock is taken first, so an index another writer holds is left alone.
    fn discard_if_schema_changed(&self, path: &Path) -> SearchResult<bool> {
        let context = || format!("failed to replace index at {}", path.display());
        let index = Index::open_in_dir(path).map_err(|e| SearchError::write(context(), e))?;
        if ensure_schema(&index, &self.engine_schema).is_ok() {
            return Ok(false);
        }
        register_analyzers(index.tokenizers()).map_err(|e| SearchError::write(context(), e))?;

        let writer: IndexWriter = index
            .writer_with_num_threads(self.config.writer_threads, self.config.writer_buffer_bytes())
            .map_err(|e| SearchError::writer_open(path.to_path_buf(), e))?;
        writer
            .wait_merging_threads()
            .map_err(|e| SearchError::write(context(), e))?;
        drop(index);

        std::fs::remove_dir_all(path).map_err(|e| SearchError::write(context(), e))?;
        tracing::info!(path = %path.display(), "Removed index with a different schema");
        Ok(true)
    }

    /// The open writer, opening it on first use
    fn writer(&mut self) -> SearchResult<&mut OpenWriter> {
        if let SessionState::Closed = self.state {
            let open = self.open()?;
            self.state = SessionState::Open(Box::new(open));
        }
        match &mut self.state {
            SessionState::Open(open) => Ok(open),
            SessionState::Closed => Err(SearchError::InvalidConfiguration(
                "index writer session is closed".to_string(),
            )),
        }
    }

    /// Buffer documents, replacing earlier documents with the same id
    pub fn add_documents(&mut self, documents: Vec<PreparedDocument>) -> SearchResult<usize> {
        let open = self.writer()?;
        let mut added = 0;
        for document in documents {
            open.writer
                .delete_term(Term::from_field_text(open.id_field, &document.id));
            open.writer.add_document(document.doc).map_err(|e| {
                SearchError::write(format!("failed to add document '{}'", document.id), e)
            })?;
            open.pending += 1;
            added += 1;
        }
        Ok(added)
    }

    /// Remove documents by id; takes effect at the next commit
    pub fn delete_ids<S: AsRef<str>>(&mut self, ids: &[S]) -> SearchResult<usize> {
        let open = self.writer()?;
        for id in ids {
            open.writer
                .delete_term(Term::from_field_text(open.id_field, id.as_ref().trim()));
        }
        open.pending += ids.len();
        Ok(ids.len())
    }

    /// Make buffered writes durable and visible to new snapshots
    pub fn commit(&mut self) -> SearchResult<Opstamp> {
        let open = self.writer()?;
        let opstamp = open
            .writer
            .commit()
            .map_err(|e| SearchError::write("failed to commit", e))?;
        tracing::debug!(opstamp, documents = open.pending, "Committed index writer");
        open.pending = 0;
        Ok(opstamp)
    }

    /// Discard writes since the last commit. No-op when closed.
    pub fn rollback(&mut self) -> SearchResult<()> {
        if let SessionState::Open(open) = &mut self.state {
            open.writer
                .rollback()
                .map_err(|e| SearchError::write("failed to roll back uncommitted writes", e))?;
            open.pending = 0;
        }
        Ok(())
    }

    /// Close the writer and release the write lock. No-op when closed.
    pub fn release(&mut self) -> SearchResult<()> {
        let state = std::mem::replace(&mut self.state, SessionState::Closed);
        if let SessionState::Open(open) = state {
            let OpenWriter {
                writer, pending, ..
            } = *open;
            if pending > 0 {
                tracing::warn!(pending, "Releasing index writer with uncommitted writes");
            }
            writer
                .wait_merging_threads()
                .map_err(|e| SearchError::write("failed to close index writer", e))?;
            tracing::info!(path = %self.config.index_path.display(), "Released index writer");
        }
        Ok(())
    }
}

impl Drop for IndexWriterSession {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "Failed to release index writer on drop");
        }
    }
}
