//! Query composition
//!
//! [`QueryBuilder`] turns an ordered list of typed clauses into one boolean
//! [`ComposedQuery`]. Clauses with a missing or blank value are skipped, so optional
//! criteria can be chained without branching:
//!
//! ```no_run
//! # use docsearch::search::{Analyzer, IndexSchema, QueryBuilder, Requirement};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = IndexSchema::new("id").exact("name").analyzed("desc").i64("born");
//! let dynasty: Option<String> = None;
//!
//! let query = QueryBuilder::new(&schema, Analyzer::Standard)?
//!     .match_text("desc", "moon wine")
//!     .term("name", dynasty.as_deref())
//!     .long_range_with("born", Some(700), None, Requirement::Should)
//!     .build()?;
//! assert_eq!(query.len(), 2);
//! # Ok(())
//! # }
//! ```

use crate::search::analysis::{tokenizer_manager, Analyzer};
use crate::search::document::{FieldKind, IndexSchema};
use crate::search::error::{SearchError, SearchResult};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::ops::Bound;
use std::sync::Arc;
use tantivy::query::{
    BooleanQuery, FuzzyTermQuery, Occur, PhraseQuery, Query, QueryParser, RangeQuery, RegexQuery,
    TermQuery,
};
use tantivy::schema::{Field, IndexRecordOption, Schema};
use tantivy::tokenizer::{TokenStream, TokenizerManager};
use tantivy::Term;

/// Highest edit distance a fuzzy clause accepts
pub const MAX_FUZZY_EDITS: u8 = 2;

/// Logical requirement of a clause
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    #[default]
    Must,
    Should,
    MustNot,
}

impl From<Requirement> for Occur {
    fn from(requirement: Requirement) -> Self {
        match requirement {
            Requirement::Must => Occur::Must,
            Requirement::Should => Occur::Should,
            Requirement::MustNot => Occur::MustNot,
        }
    }
}

/// What a clause matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClauseKind {
    ExactTerm,
    AnalyzedText,
    Prefix,
    Wildcard,
    Fuzzy { max_edits: u8 },
    Phrase { slop: u32 },
    NumericRange { lower: i64, upper: i64 },
    /// Bounds in UTC epoch milliseconds
    DateRange { lower: i64, upper: i64 },
    MultiFieldOr,
}

/// One composed clause, as recorded by the builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub fields: Vec<String>,
    pub values: Vec<String>,
    pub kind: ClauseKind,
    pub requirement: Requirement,
}

/// Values a clause accepts; `None` and blank text mean "skip this clause"
pub trait ClauseText {
    fn clause_text(&self) -> Option<&str>;
}

impl ClauseText for str {
    fn clause_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl ClauseText for String {
    fn clause_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl<T: ClauseText + ?Sized> ClauseText for &T {
    fn clause_text(&self) -> Option<&str> {
        (**self).clause_text()
    }
}

impl<T: ClauseText> ClauseText for Option<T> {
    fn clause_text(&self) -> Option<&str> {
        self.as_ref().and_then(ClauseText::clause_text)
    }
}

fn present<V: ClauseText + ?Sized>(value: &V) -> Option<&str> {
    value.clause_text().filter(|text| !text.trim().is_empty())
}

/// An immutable boolean query built by [`QueryBuilder`]
#[derive(Debug, Clone)]
pub struct ComposedQuery {
    clauses: Vec<Clause>,
    query: BooleanQuery,
}

impl ComposedQuery {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub(crate) fn engine_query(&self) -> &dyn Query {
        &self.query
    }
}

/// Schema and tokenizers the builder resolves fields against
#[derive(Clone)]
pub(crate) struct QueryContext {
    pub schema: IndexSchema,
    pub engine: Schema,
    pub analyzer: Analyzer,
    pub tokenizers: TokenizerManager,
}

impl QueryContext {
    pub fn new(schema: &IndexSchema, analyzer: Analyzer) -> SearchResult<Self> {
        schema.validate()?;
        let tokenizers = tokenizer_manager().map_err(|e| {
            SearchError::InvalidConfiguration(format!("failed to build analyzers: {e}"))
        })?;
        Ok(Self {
            schema: schema.clone(),
            engine: schema.to_engine_schema(analyzer),
            analyzer,
            tokenizers,
        })
    }
}

/// Fluent builder for [`ComposedQuery`].
///
/// Every clause method takes the builder by value. The first composition error is
/// kept, later clauses are ignored, and [`QueryBuilder::build`] reports it.
pub struct QueryBuilder {
    context: Arc<QueryContext>,
    clauses: Vec<Clause>,
    subqueries: Vec<(Occur, Box<dyn Query>)>,
    error: Option<SearchError>,
}

impl QueryBuilder {
    pub fn new(schema: &IndexSchema, analyzer: Analyzer) -> SearchResult<Self> {
        Ok(Self::with_context(Arc::new(QueryContext::new(schema, analyzer)?)))
    }

    pub(crate) fn with_context(context: Arc<QueryContext>) -> Self {
        Self {
            context,
            clauses: Vec::new(),
            subqueries: Vec::new(),
            error: None,
        }
    }

    /// Exact term match, value not analyzed
    pub fn term<V: ClauseText>(self, field: &str, value: V) -> Self {
        self.term_with(field, value, Requirement::Must)
    }

    pub fn term_with<V: ClauseText>(self, field: &str, value: V, requirement: Requirement) -> Self {
        let Some(value) = present(&value).map(str::to_string) else {
            return self;
        };
        self.add(field, &[FieldKind::Exact, FieldKind::Analyzed], |field, kind, _| {
            let query = TermQuery::new(Term::from_field_text(field, &value), record_option(kind));
            Ok(Some((
                Box::new(query) as Box<dyn Query>,
                ClauseKind::ExactTerm,
                vec![value.clone()],
            )))
        }, requirement)
    }

    /// Full-text match through the field's analyzer
    pub fn match_text<V: ClauseText>(self, field: &str, text: V) -> Self {
        self.match_text_with(field, text, Requirement::Must)
    }

    pub fn match_text_with<V: ClauseText>(
        self,
        field: &str,
        text: V,
        requirement: Requirement,
    ) -> Self {
        let Some(text) = present(&text).map(str::to_string) else {
            return self;
        };
        self.add(field, &[FieldKind::Exact, FieldKind::Analyzed], |field, _, context| {
            let parser = QueryParser::new(
                context.engine.clone(),
                vec![field],
                context.tokenizers.clone(),
            );
            let query = parser.parse_query(&text)?;
            Ok(Some((query, ClauseKind::AnalyzedText, vec![text.clone()])))
        }, requirement)
    }

    /// Terms starting with `prefix`
    pub fn prefix<V: ClauseText>(self, field: &str, prefix: V) -> Self {
        self.prefix_with(field, prefix, Requirement::Must)
    }

    pub fn prefix_with<V: ClauseText>(self, field: &str, prefix: V, requirement: Requirement) -> Self {
        let Some(prefix) = present(&prefix).map(str::to_string) else {
            return self;
        };
        self.add(field, &[FieldKind::Exact, FieldKind::Analyzed], |field, _, _| {
            let pattern = format!("{}.*", regex::escape(&prefix));
            let query = regex_query(&pattern, field)?;
            Ok(Some((query, ClauseKind::Prefix, vec![prefix.clone()])))
        }, requirement)
    }

    /// Wildcard pattern: `*` matches any sequence, `?` a single character
    pub fn wildcard<V: ClauseText>(self, field: &str, pattern: V) -> Self {
        self.wildcard_with(field, pattern, Requirement::Must)
    }

    pub fn wildcard_with<V: ClauseText>(
        self,
        field: &str,
        pattern: V,
        requirement: Requirement,
    ) -> Self {
        let Some(pattern) = present(&pattern).map(str::to_string) else {
            return self;
        };
        self.add(field, &[FieldKind::Exact, FieldKind::Analyzed], |field, _, _| {
            let query = regex_query(&wildcard_to_regex(&pattern), field)?;
            Ok(Some((query, ClauseKind::Wildcard, vec![pattern.clone()])))
        }, requirement)
    }

    /// Terms within [`MAX_FUZZY_EDITS`] edits of `term`
    pub fn fuzzy<V: ClauseText>(self, field: &str, term: V) -> Self {
        self.fuzzy_with(field, term, MAX_FUZZY_EDITS, Requirement::Must)
    }

    pub fn fuzzy_with<V: ClauseText>(
        self,
        field: &str,
        term: V,
        max_edits: u8,
        requirement: Requirement,
    ) -> Self {
        let Some(term) = present(&term).map(str::to_string) else {
            return self;
        };
        self.add(field, &[FieldKind::Exact, FieldKind::Analyzed], |field, _, _| {
            if max_edits > MAX_FUZZY_EDITS {
                return Err(SearchError::QueryComposition(format!(
                    "fuzzy max edits must be at most {MAX_FUZZY_EDITS}, got {max_edits}"
                )));
            }
            let query = FuzzyTermQuery::new(Term::from_field_text(field, &term), max_edits, true);
            Ok(Some((
                Box::new(query) as Box<dyn Query>,
                ClauseKind::Fuzzy { max_edits },
                vec![term.clone()],
            )))
        }, requirement)
    }

    /// Terms in order, with no gaps
    pub fn phrase<I, S>(self, field: &str, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.phrase_with(field, terms, 0, Requirement::Must)
    }

    /// Terms in order, allowing `slop` position moves
    pub fn phrase_with<I, S>(self, field: &str, terms: I, slop: u32, requirement: Requirement) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: Vec<String> = terms
            .into_iter()
            .filter_map(|term| present(term.as_ref()).map(str::to_string))
            .collect();
        if terms.is_empty() {
            return self;
        }
        self.add(field, &[FieldKind::Analyzed], |field, _, context| {
            let text = terms.join(context.analyzer.phrase_separator());
            let Some(query) = phrase_query(context, field, &text, slop)? else {
                return Ok(None);
            };
            Ok(Some((query, ClauseKind::Phrase { slop }, terms.clone())))
        }, requirement)
    }

    /// Integer range; a missing bound is open on that side
    pub fn long_range(self, field: &str, lower: Option<i64>, upper: Option<i64>) -> Self {
        self.long_range_with(field, lower, upper, Requirement::Must)
    }

    pub fn long_range_with(
        self,
        field: &str,
        lower: Option<i64>,
        upper: Option<i64>,
        requirement: Requirement,
    ) -> Self {
        if lower.is_none() && upper.is_none() {
            return self;
        }
        let lower = lower.unwrap_or(i64::MIN);
        let upper = upper.unwrap_or(i64::MAX);
        self.add(field, &[FieldKind::I64], |_, _, _| {
            let query = i64_range(field, lower, upper);
            Ok(Some((query, ClauseKind::NumericRange { lower, upper }, Vec::new())))
        }, requirement)
    }

    /// Date range; bounds are converted to UTC before comparison
    pub fn date_range<Tz: TimeZone>(
        self,
        field: &str,
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
    ) -> Self {
        self.date_range_with(field, start, end, Requirement::Must)
    }

    pub fn date_range_with<Tz: TimeZone>(
        self,
        field: &str,
        start: Option<DateTime<Tz>>,
        end: Option<DateTime<Tz>>,
        requirement: Requirement,
    ) -> Self {
        if start.is_none() && end.is_none() {
            return self;
        }
        let lower = start.map_or(i64::MIN, |d| d.with_timezone(&Utc).timestamp_millis());
        let upper = end.map_or(i64::MAX, |d| d.with_timezone(&Utc).timestamp_millis());
        self.add(field, &[FieldKind::Date], |_, _, _| {
            let query = i64_range(field, lower, upper);
            Ok(Some((query, ClauseKind::DateRange { lower, upper }, Vec::new())))
        }, requirement)
    }

    /// At least one of `fields` holds `text` as an exact term.
    ///
    /// Added as a single MUST clause, so other clauses stay independently required.
    pub fn multi_match<V: ClauseText>(mut self, fields: &[&str], text: V) -> Self {
        let Some(text) = present(&text).map(str::to_string) else {
            return self;
        };
        if fields.is_empty() || self.error.is_some() {
            return self;
        }

        let mut alternatives: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(fields.len());
        for name in fields {
            match self.resolve(name, &[FieldKind::Exact, FieldKind::Analyzed]) {
                Ok((field, kind)) => alternatives.push((
                    Occur::Should,
                    Box::new(TermQuery::new(
                        Term::from_field_text(field, &text),
                        record_option(kind),
                    )),
                )),
                Err(e) => {
                    self.error = Some(e);
                    return self;
                }
            }
        }

        self.clauses.push(Clause {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            values: vec![text],
            kind: ClauseKind::MultiFieldOr,
            requirement: Requirement::Must,
        });
        self.subqueries
            .push((Occur::Must, Box::new(BooleanQuery::new(alternatives))));
        self
    }

    /// Finish composition
    pub fn build(self) -> SearchResult<ComposedQuery> {
        if let Some(e) = self.error {
            return Err(e);
        }
        Ok(ComposedQuery {
            clauses: self.clauses,
            query: BooleanQuery::new(self.subqueries),
        })
    }

    fn resolve(&self, name: &str, allowed: &[FieldKind]) -> SearchResult<(Field, FieldKind)> {
        if name.trim().is_empty() {
            return Err(SearchError::QueryComposition(
                "field name must not be empty".to_string(),
            ));
        }
        let kind = self.context.schema.kind_of(name).ok_or_else(|| {
            SearchError::QueryComposition(format!("unknown field '{name}'"))
        })?;
        if !allowed.contains(&kind) {
            return Err(SearchError::QueryComposition(format!(
                "field '{name}' of kind {kind:?} does not support this clause"
            )));
        }
        let field = self.context.engine.get_field(name).map_err(|_| {
            SearchError::QueryComposition(format!("unknown field '{name}'"))
        })?;
        Ok((field, kind))
    }

    fn add<F>(mut self, name: &str, allowed: &[FieldKind], make: F, requirement: Requirement) -> Self
    where
        F: FnOnce(
            Field,
            FieldKind,
            &QueryContext,
        ) -> SearchResult<Option<(Box<dyn Query>, ClauseKind, Vec<String>)>>,
    {
        if self.error.is_some() {
            return self;
        }
        let built = self
            .resolve(name, allowed)
            .and_then(|(field, kind)| make(field, kind, &self.context));
        match built {
            Ok(Some((query, kind, values))) => {
                self.clauses.push(Clause {
                    fields: vec![name.to_string()],
                    values,
                    kind,
                    requirement,
                });
                self.subqueries.push((requirement.into(), query));
            }
            Ok(None) => {}
            Err(e) => self.error = Some(e),
        }
        self
    }
}

fn record_option(kind: FieldKind) -> IndexRecordOption {
    match kind {
        FieldKind::Analyzed => IndexRecordOption::WithFreqs,
        _ => IndexRecordOption::Basic,
    }
}

/// Analyze `text` with the field's tokenizer and match the tokens at their positions.
///
/// A single token degrades to a term query; no tokens skips the clause.
fn phrase_query(
    context: &QueryContext,
    field: Field,
    text: &str,
    slop: u32,
) -> SearchResult<Option<Box<dyn Query>>> {
    let mut analyzer = context
        .tokenizers
        .get(context.analyzer.tokenizer_name())
        .ok_or_else(|| {
            SearchError::QueryComposition(format!(
                "analyzer '{}' is not registered",
                context.analyzer.tokenizer_name()
            ))
        })?;

    let mut terms: Vec<(usize, Term)> = Vec::new();
    let mut stream = analyzer.token_stream(text);
    while stream.advance() {
        let token = stream.token();
        terms.push((token.position, Term::from_field_text(field, &token.text)));
    }

    match terms.len() {
        0 => Ok(None),
        1 => {
            let (_, term) = terms.remove(0);
            Ok(Some(Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs))))
        }
        _ => {
            let mut query = PhraseQuery::new_with_offset(terms);
            query.set_slop(slop);
            Ok(Some(Box::new(query)))
        }
    }
}

fn regex_query(pattern: &str, field: Field) -> SearchResult<Box<dyn Query>> {
    let query = RegexQuery::from_pattern(pattern, field)
        .map_err(|e| SearchError::QueryComposition(format!("invalid pattern '{pattern}': {e}")))?;
    Ok(Box::new(query))
}

fn i64_range(field: &str, lower: i64, upper: i64) -> Box<dyn Query> {
    Box::new(RangeQuery::new_i64_bounds(
        field.to_string(),
        Bound::Included(lower),
        Bound::Included(upper),
    ))
}

/// Translate `*`/`?` wildcards into an anchored regex over a whole term
fn wildcard_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() * 2);
    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '*' | '?' => {
                regex.push_str(&regex::escape(&literal));
                literal.clear();
                regex.push_str(if c == '*' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    regex.push_str(&regex::escape(&literal));
    regex
}

/// Produces the query for a search text aimed at one field
pub trait QueryProvider {
    fn compose(&self, builder: QueryBuilder, text: &str, field: &str) -> SearchResult<ComposedQuery>;
}

/// Analyzed-text match on the requested field
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchQueryProvider;

impl QueryProvider for MatchQueryProvider {
    fn compose(&self, builder: QueryBuilder, text: &str, field: &str) -> SearchResult<ComposedQuery> {
        builder.match_text(field, text).build()
    }
}

impl<F> QueryProvider for F
where
    F: Fn(QueryBuilder, &str, &str) -> SearchResult<ComposedQuery>,
{
    fn compose(&self, builder: QueryBuilder, text: &str, field: &str) -> SearchResult<ComposedQuery> {
        self(builder, text, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn schema() -> IndexSchema {
        IndexSchema::new("id")
            .exact("name")
            .analyzed("desc")
            .i64("born")
            .date("updated_at")
    }

    fn builder() -> QueryBuilder {
        QueryBuilder::new(&schema(), Analyzer::Standard).unwrap()
    }

    #[test]
    fn test_blank_values_are_skipped() {
        let missing: Option<String> = None;
        let query = builder()
            .term("name", "")
            .term("name", "   ")
            .term("name", missing.as_deref())
            .match_text("desc", &missing)
            .prefix("name", None::<&str>)
            .wildcard("name", " ")
            .fuzzy("name", "")
            .phrase("desc", ["", " "])
            .long_range("born", None, None)
            .date_range::<Utc>("updated_at", None, None)
            .multi_match(&["name", "desc"], "")
            .build()
            .unwrap();
        assert!(query.is_empty());
    }

    #[test]
    fn test_clauses_keep_insertion_order() {
        let query = builder()
            .match_text("desc", "moon")
            .term_with("name", "Li Bai", Requirement::Should)
            .fuzzy_with("name", "Du Fu", 1, Requirement::MustNot)
            .long_range("born", Some(700), Some(800))
            .build()
            .unwrap();

        let kinds: Vec<&ClauseKind> = query.clauses().iter().map(|c| &c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &ClauseKind::AnalyzedText,
                &ClauseKind::ExactTerm,
                &ClauseKind::Fuzzy { max_edits: 1 },
                &ClauseKind::NumericRange {
                    lower: 700,
                    upper: 800
                },
            ]
        );
        assert_eq!(query.clauses()[1].requirement, Requirement::Should);
        assert_eq!(query.clauses()[2].requirement, Requirement::MustNot);
        assert_eq!(query.clauses()[0].requirement, Requirement::Must);
    }

    #[test]
    fn test_open_range_bounds_use_type_extremes() {
        let query = builder().long_range("born", Some(701), None).build().unwrap();
        assert_eq!(
            query.clauses()[0].kind,
            ClauseKind::NumericRange {
                lower: 701,
                upper: i64::MAX
            }
        );

        let query = builder().long_range("born", None, Some(770)).build().unwrap();
        assert_eq!(
            query.clauses()[0].kind,
            ClauseKind::NumericRange {
                lower: i64::MIN,
                upper: 770
            }
        );
    }

    #[test]
    fn test_date_range_is_normalized_to_utc() {
        let beijing = FixedOffset::east_opt(8 * 3600).unwrap();
        let start = beijing.with_ymd_and_hms(2024, 11, 24, 8, 0, 0).unwrap();
        let query = builder()
            .date_range("updated_at", Some(start), None)
            .build()
            .unwrap();

        let expected = Utc
            .with_ymd_and_hms(2024, 11, 24, 0, 0, 0)
            .unwrap()
            .timestamp_millis();
        assert_eq!(
            query.clauses()[0].kind,
            ClauseKind::DateRange {
                lower: expected,
                upper: i64::MAX
            }
        );
    }

    #[test]
    fn test_multi_match_is_one_must_clause() {
        let query = builder()
            .multi_match(&["name", "desc"], "Li Bai")
            .build()
            .unwrap();
        assert_eq!(query.len(), 1);
        let clause = &query.clauses()[0];
        assert_eq!(clause.kind, ClauseKind::MultiFieldOr);
        assert_eq!(clause.requirement, Requirement::Must);
        assert_eq!(clause.fields, vec!["name".to_string(), "desc".to_string()]);
    }

    #[test]
    fn test_unknown_field_is_composition_error() {
        let err = builder().term("dynasty", "Tang").build().unwrap_err();
        assert!(matches!(err, SearchError::QueryComposition(_)));

        let err = builder().term("", "Tang").build().unwrap_err();
        assert!(matches!(err, SearchError::QueryComposition(_)));
    }

    #[test]
    fn test_kind_mismatch_is_composition_error() {
        assert!(builder().long_range("desc", Some(1), None).build().is_err());
        assert!(builder().term("born", "701").build().is_err());
        assert!(builder().phrase("name", ["li", "bai"]).build().is_err());
    }

    #[test]
    fn test_fuzzy_edit_limit() {
        let err = builder()
            .fuzzy_with("name", "libai", 3, Requirement::Must)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("at most 2"));
    }

    #[test]
    fn test_first_error_wins() {
        let err = builder()
            .term("dynasty", "Tang")
            .fuzzy_with("name", "x", 9, Requirement::Must)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("dynasty"));
    }

    #[test]
    fn test_match_text_parse_error() {
        let err = builder().match_text("desc", "dynasty:tang").build();
        assert!(matches!(err, Err(SearchError::QueryComposition(_))));
    }

    #[test]
    fn test_single_term_phrase_is_accepted() {
        let query = builder().phrase("desc", ["moon"]).build().unwrap();
        assert_eq!(query.clauses()[0].kind, ClauseKind::Phrase { slop: 0 });
        assert_eq!(query.clauses()[0].values, vec!["moon".to_string()]);
    }

    #[test]
    fn test_wildcard_translation() {
        assert_eq!(wildcard_to_regex("li*"), "li.*");
        assert_eq!(wildcard_to_regex("l?bai"), "l.bai");
        assert_eq!(wildcard_to_regex("a.b*"), "a\\.b.*");
    }

    #[test]
    fn test_match_provider_builds_analyzed_clause() {
        let query = MatchQueryProvider
            .compose(builder(), "bright moon", "desc")
            .unwrap();
        assert_eq!(query.clauses()[0].kind, ClauseKind::AnalyzedText);
    }

    #[test]
    fn test_closure_provider() {
        let provider = |b: QueryBuilder, text: &str, _field: &str| {
            b.multi_match(&["name", "desc"], text).build()
        };
        let query = provider.compose(builder(), "Li Bai", "ignored").unwrap();
        assert_eq!(query.clauses()[0].kind, ClauseKind::MultiFieldOr);
    }
}
