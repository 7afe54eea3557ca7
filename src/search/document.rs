//! Field model shared by the write and read path

use crate::search::analysis::Analyzer;
use crate::search::error::{SearchError, SearchResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, Value, FAST, INDEXED,
    STORED, STRING,
};
use tantivy::TantivyDocument;

/// How a field is indexed and stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Indexed as a single untokenized term, stored verbatim, sortable
    Exact,
    /// Tokenized by the configured analyzer, stored verbatim
    Analyzed,
    /// Signed integer, indexed for ranges
    I64,
    /// UTC timestamp, indexed as epoch milliseconds
    Date,
}

impl FieldKind {
    pub fn is_text(&self) -> bool {
        matches!(self, FieldKind::Exact | FieldKind::Analyzed)
    }
}

/// A declared field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

/// Declared fields of an index plus the field holding the unique identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSchema {
    id_field: String,
    #[serde(default)]
    fields: Vec<FieldDef>,
}

impl IndexSchema {
    /// Start a schema whose documents are identified by `id_field`.
    ///
    /// The id field is declared as an exact field.
    pub fn new(id_field: impl Into<String>) -> Self {
        let id_field = id_field.into();
        Self {
            fields: vec![FieldDef {
                name: id_field.clone(),
                kind: FieldKind::Exact,
            }],
            id_field,
        }
    }

    pub fn exact(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Exact)
    }

    pub fn analyzed(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Analyzed)
    }

    pub fn i64(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::I64)
    }

    pub fn date(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Date)
    }

    /// Declare a field; redeclaring a name replaces its kind
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|def| def.name == name) {
            Some(def) => def.kind = kind,
            None => self.fields.push(FieldDef { name, kind }),
        }
        self
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.fields
            .iter()
            .find(|def| def.name == name)
            .map(|def| def.kind)
    }

    /// Check the declarations are usable
    pub fn validate(&self) -> SearchResult<()> {
        let mut seen = HashSet::new();
        for def in &self.fields {
            if def.name.trim().is_empty() {
                return Err(SearchError::InvalidConfiguration(
                    "field names must not be empty".to_string(),
                ));
            }
            if !seen.insert(def.name.as_str()) {
                return Err(SearchError::InvalidConfiguration(format!(
                    "field '{}' is declared twice",
                    def.name
                )));
            }
        }
        match self.kind_of(&self.id_field) {
            Some(FieldKind::Exact) => Ok(()),
            Some(kind) => Err(SearchError::InvalidConfiguration(format!(
                "id field '{}' must be exact, found {:?}",
                self.id_field, kind
            ))),
            None => Err(SearchError::InvalidConfiguration(format!(
                "id field '{}' is not declared",
                self.id_field
            ))),
        }
    }

    /// Build the engine schema. Field order follows declaration order,
    /// so the same declarations always yield the same engine field ids.
    pub fn to_engine_schema(&self, analyzer: Analyzer) -> Schema {
        let mut builder = Schema::builder();
        for def in &self.fields {
            match def.kind {
                FieldKind::Exact => {
                    builder.add_text_field(&def.name, STRING | STORED | FAST);
                }
                FieldKind::Analyzed => {
                    let indexing = TextFieldIndexing::default()
                        .set_tokenizer(analyzer.tokenizer_name())
                        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
                    let options = TextOptions::default()
                        .set_indexing_options(indexing)
                        .set_stored();
                    builder.add_text_field(&def.name, options);
                }
                FieldKind::I64 | FieldKind::Date => {
                    builder.add_i64_field(&def.name, INDEXED | STORED | FAST);
                }
            }
        }
        builder.build()
    }
}

/// A single field value tagged with how it is indexed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Exact(String),
    Analyzed(String),
    I64(i64),
    Date(DateTime<Utc>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Exact(_) => FieldKind::Exact,
            FieldValue::Analyzed(_) => FieldKind::Analyzed,
            FieldValue::I64(_) => FieldKind::I64,
            FieldValue::Date(_) => FieldKind::Date,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Exact(text) | FieldValue::Analyzed(text) => Some(text),
            _ => None,
        }
    }

    /// Stored content rendered as text
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Exact(text) | FieldValue::Analyzed(text) => text.clone(),
            FieldValue::I64(value) => value.to_string(),
            FieldValue::Date(value) => value.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Ordered field name → value mapping with unique names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    entries: Vec<(String, FieldValue)>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing an earlier value under the same name in place
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_exact(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(name, FieldValue::Exact(value.into()))
    }

    pub fn with_analyzed(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(name, FieldValue::Analyzed(value.into()))
    }

    pub fn with_i64(self, name: impl Into<String>, value: i64) -> Self {
        self.with(name, FieldValue::I64(value))
    }

    pub fn with_date(self, name: impl Into<String>, value: DateTime<Utc>) -> Self {
        self.with(name, FieldValue::Date(value))
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Text content of a text field
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert to an engine document, returning the document id alongside it
    pub(crate) fn to_engine_document(
        &self,
        schema: &IndexSchema,
        engine: &Schema,
    ) -> SearchResult<(String, TantivyDocument)> {
        let id = self
            .text(schema.id_field())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                SearchError::InvalidDocument(format!(
                    "missing identifier field '{}'",
                    schema.id_field()
                ))
            })?
            .to_string();

        let mut doc = TantivyDocument::new();
        for (name, value) in self.iter() {
            let declared = schema.kind_of(name).ok_or_else(|| {
                SearchError::InvalidDocument(format!("field '{name}' is not declared"))
            })?;
            if declared != value.kind() {
                return Err(SearchError::InvalidDocument(format!(
                    "field '{name}' is declared {:?} but holds {:?}",
                    declared,
                    value.kind()
                )));
            }
            let field = engine_field(engine, name).map_err(SearchError::InvalidDocument)?;
            match value {
                // Stored trimmed so replace and delete by id hit the same term
                FieldValue::Exact(_) if name == schema.id_field() => doc.add_text(field, &id),
                FieldValue::Exact(text) | FieldValue::Analyzed(text) => doc.add_text(field, text),
                FieldValue::I64(number) => doc.add_i64(field, *number),
                FieldValue::Date(date) => doc.add_i64(field, date.timestamp_millis()),
            }
        }
        Ok((id, doc))
    }

    /// Read the stored fields of an engine document back into a FieldSet
    pub(crate) fn from_engine_document(
        doc: &TantivyDocument,
        schema: &IndexSchema,
        engine: &Schema,
    ) -> FieldSet {
        let mut fields = FieldSet::new();
        for def in schema.fields() {
            let Ok(field) = engine.get_field(&def.name) else {
                continue;
            };
            let Some(stored) = doc.get_first(field) else {
                continue;
            };
            let value = match def.kind {
                FieldKind::Exact => stored.as_str().map(|s| FieldValue::Exact(s.to_string())),
                FieldKind::Analyzed => stored.as_str().map(|s| FieldValue::Analyzed(s.to_string())),
                FieldKind::I64 => stored.as_i64().map(FieldValue::I64),
                FieldKind::Date => stored
                    .as_i64()
                    .and_then(DateTime::from_timestamp_millis)
                    .map(FieldValue::Date),
            };
            if let Some(value) = value {
                fields.insert(def.name.clone(), value);
            }
        }
        fields
    }
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

pub(crate) fn engine_field(engine: &Schema, name: &str) -> Result<Field, String> {
    engine
        .get_field(name)
        .map_err(|_| format!("field '{name}' is not part of the index schema"))
}

/// Converts domain records into field sets.
///
/// Invoked once per record during batch indexing. The returned set must carry the
/// schema's id field.
pub trait DocumentMapper<T> {
    /// Fields every mapped record may use
    fn schema(&self) -> IndexSchema;

    /// Map one record
    fn to_fields(&self, record: &T) -> FieldSet;
}
