//! Per-field fragment highlighting
//!
//! Highlighting is best effort. A field whose stored text contains no query term, or whose
//! fragment cannot be produced, is returned as the raw stored value.
//!
//! The engine lowercases fragment tokens before looking them up among the query terms, so
//! exact fields holding uppercase letters always fall back to the raw value.

use crate::search::document::{FieldSet, IndexSchema};
use std::collections::HashMap;
use std::ops::Range;
use tantivy::query::Query;
use tantivy::schema::Schema;
use tantivy::snippet::SnippetGenerator;
use tantivy::Searcher;

/// Tags wrapped around matched terms, and the fragment window size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightStyle {
    pub pre_tag: String,
    pub post_tag: String,
    pub fragment_size: usize,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            pre_tag: "<em>".to_string(),
            post_tag: "</em>".to_string(),
            fragment_size: 150,
        }
    }
}

/// Snippet generators prepared once per search, one per highlight field
pub(crate) struct Highlighter {
    generators: Vec<(String, Option<SnippetGenerator>)>,
    style: HighlightStyle,
}

impl Highlighter {
    pub fn new(
        searcher: &Searcher,
        query: &dyn Query,
        engine: &Schema,
        schema: &IndexSchema,
        fields: &[String],
        style: HighlightStyle,
    ) -> Self {
        let generators = fields
            .iter()
            .map(|name| {
                let generator = Self::generator(searcher, query, engine, schema, name, &style);
                (name.clone(), generator)
            })
            .collect();
        Self { generators, style }
    }

    fn generator(
        searcher: &Searcher,
        query: &dyn Query,
        engine: &Schema,
        schema: &IndexSchema,
        name: &str,
        style: &HighlightStyle,
    ) -> Option<SnippetGenerator> {
        if !schema.kind_of(name)?.is_text() {
            return None;
        }
        let field = engine.get_field(name).ok()?;
        match SnippetGenerator::create(searcher, query, field) {
            Ok(mut generator) => {
                generator.set_max_num_chars(style.fragment_size);
                Some(generator)
            }
            Err(e) => {
                tracing::debug!(field = %name, error = %e, "Highlighting unavailable for field");
                None
            }
        }
    }

    /// Highlighted or raw text for each configured field that has stored content
    pub fn highlight(&self, stored: &FieldSet) -> HashMap<String, String> {
        let mut highlights = HashMap::with_capacity(self.generators.len());
        for (name, generator) in &self.generators {
            let Some(value) = stored.get(name) else {
                continue;
            };
            let raw = value.to_text();
            let text = generator
                .as_ref()
                .and_then(|generator| {
                    let snippet = generator.snippet(&raw);
                    render(snippet.fragment(), snippet.highlighted(), &self.style)
                })
                .unwrap_or(raw);
            highlights.insert(name.clone(), text);
        }
        highlights
    }
}

/// Wrap highlighted byte ranges of `fragment` in tags. Overlapping ranges are merged.
///
/// Returns `None` when nothing is highlighted or a range does not fall on the fragment.
pub(crate) fn render(
    fragment: &str,
    highlighted: &[Range<usize>],
    style: &HighlightStyle,
) -> Option<String> {
    if fragment.is_empty() || highlighted.is_empty() {
        return None;
    }

    let mut ranges: Vec<Range<usize>> = highlighted
        .iter()
        .filter(|range| range.start < range.end)
        .cloned()
        .collect();
    ranges.sort_by_key(|range| range.start);
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    if merged.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(
        fragment.len() + merged.len() * (style.pre_tag.len() + style.post_tag.len()),
    );
    let mut cursor = 0;
    for range in merged {
        out.push_str(fragment.get(cursor..range.start)?);
        out.push_str(&style.pre_tag);
        out.push_str(fragment.get(range.clone())?);
        out.push_str(&style.post_tag);
        cursor = range.end;
    }
    out.push_str(fragment.get(cursor..)?);
    Some(out)
}
