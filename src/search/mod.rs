//! Batch indexing and paginated full-text search powered by Tantivy
//!
//! This module orchestrates an embedded Tantivy index:
//!
//! - **Batch Indexing**: Map domain records to field sets and commit them in chunks
//! - **Writer Lifecycle**: One exclusive writer per index location, released on every exit path
//! - **Query Composition**: Typed term, text, prefix, wildcard, fuzzy, phrase and range clauses
//! - **Pagination**: Top-K retrieval with page windows and total counts
//! - **Highlighting**: Per-field fragments with configurable tags and raw-text fallback
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐        ┌──────────────────────────┐
//! │      BatchIndexer        │        │    PaginatedSearcher     │
//! │  - index_multi()         │        │  - search()              │
//! │  - index_single()        │        │  - search_text()         │
//! │  - delete_by_ids()       │        │  - query_builder()       │
//! └──────────────────────────┘        └──────────────────────────┘
//!              │                                   │
//!              ▼                                   ▼
//! ┌──────────────────────────┐        ┌──────────────────────────┐
//! │   IndexWriterSession     │        │  QueryBuilder            │
//! │  - lazy open, lock       │        │  Highlighter             │
//! │  - commit / release      │        │  PageResult / SearchHit  │
//! └──────────────────────────┘        └──────────────────────────┘
//!              │                                   │
//!              └───────────────┬───────────────────┘
//!                              ▼
//!              ┌──────────────────────────────┐
//!              │        Tantivy Index         │
//!              └──────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use docsearch::search::{
//!     BatchIndexer, FieldSet, FnMapper, IndexSchema, PageRequest, PaginatedSearcher,
//!     SearchConfigBuilder,
//! };
//!
//! struct Poet {
//!     id: u32,
//!     name: String,
//!     desc: String,
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SearchConfigBuilder::new()
//!         .index_path("./data/poets")
//!         .highlight_fields(["desc"])
//!         .build();
//!     let schema = IndexSchema::new("id").exact("name").analyzed("desc");
//!
//!     let mapper = FnMapper::new(schema.clone(), |p: &Poet| {
//!         FieldSet::new()
//!             .with_exact("id", p.id.to_string())
//!             .with_exact("name", p.name.clone())
//!             .with_analyzed("desc", p.desc.clone())
//!     });
//!     let poets = vec![Poet {
//!         id: 1,
//!         name: "Li Bai".to_string(),
//!         desc: "Drinking alone under the moon".to_string(),
//!     }];
//!     BatchIndexer::new(config.clone(), mapper)?.index_multi(&poets)?;
//!
//!     let searcher = PaginatedSearcher::new(config, schema)?;
//!     let page = searcher.search_text("moon", "desc", &PageRequest::new(1, 10))?;
//!     for hit in &page.content {
//!         println!("{:?}", hit.highlight("desc"));
//!     }
//!
//!     Ok(())
//! }
//! ```

mod analysis;
mod config;
mod document;
mod error;
mod highlight;
mod index;
mod indexer;
mod mapping;
mod page;
mod query;
mod searcher;
mod writer;

pub use analysis::{Analyzer, CJK_TOKENIZER};
pub use config::{OpenMode, SearchConfig, SearchConfigBuilder};
pub use document::{DocumentMapper, FieldDef, FieldKind, FieldSet, FieldValue, IndexSchema};
pub use error::{SearchError, SearchResult};
pub use highlight::HighlightStyle;
pub use index::{index_exists, index_stats, IndexStats};
pub use indexer::{BatchIndexer, ChunkCommit, FnMapper, IndexReport};
pub use mapping::JsonDocumentMapper;
pub use page::{total_pages, PageRequest, PageResult, PageWindow, SearchHit};
pub use query::{
    Clause, ClauseKind, ClauseText, ComposedQuery, MatchQueryProvider, QueryBuilder,
    QueryProvider, Requirement, MAX_FUZZY_EDITS,
};
pub use searcher::PaginatedSearcher;
pub use writer::{IndexWriterSession, PreparedDocument};
