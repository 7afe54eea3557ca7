//! Paginated, highlighted search over a committed index snapshot

use crate::search::config::SearchConfig;
use crate::search::document::{FieldKind, FieldSet, IndexSchema};
use crate::search::error::{SearchError, SearchResult};
use crate::search::highlight::Highlighter;
use crate::search::index::Snapshot;
use crate::search::page::{PageRequest, PageResult, PageWindow, SearchHit};
use crate::search::query::{
    ComposedQuery, MatchQueryProvider, QueryBuilder, QueryContext, QueryProvider,
};
use std::cmp::Reverse;
use std::convert::identity;
use std::sync::Arc;
use std::time::Instant;
use tantivy::collector::{Count, TopDocs};
use tantivy::columnar::StrColumn;
use tantivy::query::Query;
use tantivy::{DocAddress, DocId, Searcher, SegmentReader, TantivyDocument};

/// Resolved ordering of a search
#[derive(Debug, Clone, PartialEq, Eq)]
enum SortOrder {
    Relevance,
    Field { name: String, ascending: bool },
}

/// Runs composed queries against the configured index location.
///
/// Each call opens its own read-only snapshot of the last commit and drops it before
/// returning. Searches never block on, or are blocked by, an open writer.
pub struct PaginatedSearcher<P = MatchQueryProvider> {
    config: SearchConfig,
    context: Arc<QueryContext>,
    highlight_fields: Vec<String>,
    provider: P,
}

impl PaginatedSearcher<MatchQueryProvider> {
    pub fn new(config: SearchConfig, schema: IndexSchema) -> SearchResult<Self> {
        config.validate()?;
        let context = Arc::new(QueryContext::new(&schema, config.analyzer)?);
        let highlight_fields = config.highlight_fields.clone();
        Ok(Self {
            config,
            context,
            highlight_fields,
            provider: MatchQueryProvider,
        })
    }
}

impl<P: QueryProvider> PaginatedSearcher<P> {
    /// Use `provider` to turn search text into a query in [`PaginatedSearcher::search_text`]
    pub fn with_provider<Q: QueryProvider>(self, provider: Q) -> PaginatedSearcher<Q> {
        PaginatedSearcher {
            config: self.config,
            context: self.context,
            highlight_fields: self.highlight_fields,
            provider,
        }
    }

    /// Replace the highlight allow-list taken from the configuration
    pub fn with_highlight_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlight_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn schema(&self) -> &IndexSchema {
        &self.context.schema
    }

    pub fn highlight_fields(&self) -> &[String] {
        &self.highlight_fields
    }

    /// A builder bound to this searcher's schema and analyzer
    pub fn query_builder(&self) -> QueryBuilder {
        QueryBuilder::with_context(Arc::clone(&self.context))
    }

    /// Search `field` for `text` through the configured [`QueryProvider`]
    pub fn search_text(
        &self,
        text: &str,
        field: &str,
        request: &PageRequest,
    ) -> SearchResult<PageResult<SearchHit>> {
        let query = self.provider.compose(self.query_builder(), text, field)?;
        self.search(&query, request)
    }

    /// Run `query` and materialize the requested page.
    ///
    /// A page past the last hit is an empty page carrying the true total, not an error.
    pub fn search(
        &self,
        query: &ComposedQuery,
        request: &PageRequest,
    ) -> SearchResult<PageResult<SearchHit>> {
        if query.is_empty() {
            return Err(SearchError::MissingQuery);
        }
        if self.highlight_fields.is_empty() {
            return Err(SearchError::MissingHighlightFields);
        }

        let started = Instant::now();
        let window = request.normalize(self.config.default_page_size);
        let ordering = self.resolve_ordering(request)?;

        let snapshot = Snapshot::open(&self.config, &self.context.engine)?;
        let searcher = snapshot.reader.searcher();
        let engine_query = query.engine_query();

        let start = window.start();
        let num_docs = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX);
        if start >= num_docs {
            let total = searcher
                .search(engine_query, &Count)
                .map_err(|e| SearchError::read("failed to count matches", e))?;
            return Ok(self.empty_page(total, window));
        }

        let limit = window.end().min(num_docs);
        let (ranked, total) = top_k(&searcher, engine_query, limit, &ordering)
            .map_err(|e| SearchError::read("failed to execute search", e))?;
        if start >= total {
            return Ok(self.empty_page(total, window));
        }

        let highlighter = Highlighter::new(
            &searcher,
            engine_query,
            &self.context.engine,
            &self.context.schema,
            &self.highlight_fields,
            self.config.highlight_style(),
        );
        let content = ranked
            .into_iter()
            .skip(start)
            .take(window.page_size)
            .map(|(score, address)| self.materialize(&searcher, &highlighter, score, address))
            .collect::<SearchResult<Vec<_>>>()?;

        tracing::debug!(
            total,
            page = window.page_number,
            size = window.page_size,
            hits = content.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Search complete"
        );
        Ok(PageResult::new(content, total as u64, window))
    }

    fn empty_page(&self, total: usize, window: PageWindow) -> PageResult<SearchHit> {
        tracing::debug!(total, page = window.page_number, "Requested page is past the last hit");
        PageResult::new(Vec::new(), total as u64, window)
    }

    fn materialize(
        &self,
        searcher: &Searcher,
        highlighter: &Highlighter,
        score: f32,
        address: DocAddress,
    ) -> SearchResult<SearchHit> {
        let doc: TantivyDocument = searcher
            .doc(address)
            .map_err(|e| SearchError::read("failed to load stored document", e))?;
        let fields = FieldSet::from_engine_document(&doc, &self.context.schema, &self.context.engine);
        let highlights = highlighter.highlight(&fields);
        Ok(SearchHit {
            fields,
            highlights,
            score,
        })
    }

    fn resolve_ordering(&self, request: &PageRequest) -> SearchResult<SortOrder> {
        let Some(name) = request
            .sort_field
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
        else {
            return Ok(SortOrder::Relevance);
        };
        match self.context.schema.kind_of(name) {
            Some(FieldKind::Exact) => Ok(SortOrder::Field {
                name: name.to_string(),
                ascending: request.sort_ascending.unwrap_or(true),
            }),
            Some(kind) => Err(SearchError::InvalidSortField(format!(
                "field '{name}' of kind {kind:?} is not sortable; sort by an exact field"
            ))),
            None => Err(SearchError::InvalidSortField(format!(
                "field '{name}' is not declared"
            ))),
        }
    }
}

/// The top `limit` hits in rank order plus the total match count
fn top_k(
    searcher: &Searcher,
    query: &dyn Query,
    limit: usize,
    ordering: &SortOrder,
) -> tantivy::Result<(Vec<(f32, DocAddress)>, usize)> {
    match ordering {
        SortOrder::Relevance => {
            let collector = (TopDocs::with_limit(limit), Count);
            searcher.search(query, &collector)
        }
        SortOrder::Field {
            name,
            ascending: true,
        } => sorted_by_field(searcher, query, limit, name.clone(), Reverse),
        SortOrder::Field {
            name,
            ascending: false,
        } => sorted_by_field(searcher, query, limit, name.clone(), identity),
    }
}

/// Order by the string value of a fast field; `wrap` decides the direction
fn sorted_by_field<S>(
    searcher: &Searcher,
    query: &dyn Query,
    limit: usize,
    field: String,
    wrap: fn(String) -> S,
) -> tantivy::Result<(Vec<(f32, DocAddress)>, usize)>
where
    S: 'static + PartialOrd + Clone + Send + Sync,
{
    let collector = TopDocs::with_limit(limit).custom_score(move |segment: &SegmentReader| {
        let column = segment.fast_fields().str(&field).ok().flatten();
        move |doc: DocId| wrap(sort_key(column.as_ref(), doc))
    });
    let (ranked, total) = searcher.search(query, &(collector, Count))?;
    Ok((
        ranked.into_iter().map(|(_, address)| (0.0, address)).collect(),
        total,
    ))
}

fn sort_key(column: Option<&StrColumn>, doc: DocId) -> String {
    let mut key = String::new();
    let Some(column) = column else {
        return key;
    };
    if let Some(ord) = column.term_ords(doc).next() {
        if column.ord_to_str(ord, &mut key).is_err() {
            key.clear();
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::config::SearchConfigBuilder;
    use crate::search::indexer::{BatchIndexer, FnMapper};
    use tempfile::TempDir;

    struct Poet {
        id: &'static str,
        name: &'static str,
        desc: &'static str,
    }

    const POETS: [Poet; 4] = [
        Poet {
            id: "1",
            name: "Li Bai",
            desc: "wrote about the bright moon and wine",
        },
        Poet {
            id: "2",
            name: "Du Fu",
            desc: "wrote about war and the people",
        },
        Poet {
            id: "3",
            name: "Wang Wei",
            desc: "painted mountains and wrote about the moon",
        },
        Poet {
            id: "4",
            name: "Bai Juyi",
            desc: "wrote long ballads",
        },
    ];

    fn schema() -> IndexSchema {
        IndexSchema::new("id").exact("name").analyzed("desc")
    }

    fn config(dir: &TempDir) -> SearchConfig {
        SearchConfigBuilder::new()
            .index_path(dir.path())
            .writer_buffer_mb(50)
            .highlight_fields(["desc"])
            .build()
    }

    fn indexed() -> (TempDir, PaginatedSearcher) {
        let temp_dir = TempDir::new().unwrap();
        let mapper = FnMapper::new(schema(), |p: &Poet| {
            FieldSet::new()
                .with_exact("id", p.id)
                .with_exact("name", p.name)
                .with_analyzed("desc", p.desc)
        });
        BatchIndexer::new(config(&temp_dir), mapper)
            .unwrap()
            .index_multi(&POETS)
            .unwrap();
        let searcher = PaginatedSearcher::new(config(&temp_dir), schema()).unwrap();
        (temp_dir, searcher)
    }

    #[test]
    fn test_empty_query_is_rejected() {
        let (_dir, searcher) = indexed();
        let query = searcher.query_builder().term("name", "").build().unwrap();
        let err = searcher.search(&query, &PageRequest::new(1, 10)).unwrap_err();
        assert!(matches!(err, SearchError::MissingQuery));
    }

    #[test]
    fn test_empty_highlight_list_is_rejected() {
        let (_dir, searcher) = indexed();
        let searcher = searcher.with_highlight_fields(Vec::<String>::new());
        let err = searcher
            .search_text("moon", "desc", &PageRequest::new(1, 10))
            .unwrap_err();
        assert!(matches!(err, SearchError::MissingHighlightFields));
    }

    #[test]
    fn test_match_highlights_terms() {
        let (_dir, searcher) = indexed();
        let page = searcher
            .search_text("moon", "desc", &PageRequest::new(1, 10))
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.content.len(), 2);
        for hit in &page.content {
            assert!(hit.highlight("desc").unwrap().contains("<em>moon</em>"));
            assert!(hit.score > 0.0);
        }
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let (_dir, searcher) = indexed();
        let page = searcher
            .search_text("wrote", "desc", &PageRequest::new(9, 2))
            .unwrap();
        assert!(page.content.is_empty());
        assert_eq!(page.total, 4);
        assert_eq!(page.page_number, 9);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_second_page_holds_remainder() {
        let (_dir, searcher) = indexed();
        let page = searcher
            .search_text("wrote", "desc", &PageRequest::new(2, 3))
            .unwrap();
        assert_eq!(page.total, 4);
        assert_eq!(page.content.len(), 1);
    }

    #[test]
    fn test_sort_by_exact_field() {
        let (_dir, searcher) = indexed();
        let query = searcher.query_builder().match_text("desc", "wrote").build().unwrap();

        let ascending = searcher
            .search(&query, &PageRequest::new(1, 10).sorted_by("name", true))
            .unwrap();
        let names: Vec<&str> = ascending
            .content
            .iter()
            .map(|hit| hit.fields.text("name").unwrap())
            .collect();
        assert_eq!(names, vec!["Bai Juyi", "Du Fu", "Li Bai", "Wang Wei"]);
        assert!(ascending.content.iter().all(|hit| hit.score == 0.0));

        let descending = searcher
            .search(&query, &PageRequest::new(1, 2).sorted_by("name", false))
            .unwrap();
        let names: Vec<&str> = descending
            .content
            .iter()
            .map(|hit| hit.fields.text("name").unwrap())
            .collect();
        assert_eq!(names, vec!["Wang Wei", "Li Bai"]);
    }

    #[test]
    fn test_sort_by_analyzed_field_is_rejected() {
        let (_dir, searcher) = indexed();
        let err = searcher
            .search_text("moon", "desc", &PageRequest::new(1, 10).sorted_by("desc", true))
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidSortField(_)));
    }

    #[test]
    fn test_missing_index_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let searcher = PaginatedSearcher::new(config(&temp_dir), schema()).unwrap();
        let err = searcher
            .search_text("moon", "desc", &PageRequest::new(1, 10))
            .unwrap_err();
        assert!(matches!(err, SearchError::IndexRead { .. }));
    }
}
