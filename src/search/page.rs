//! Page requests and result envelopes

use crate::search::document::FieldSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One page of a search, as asked for by the caller.
///
/// Numbers are signed so out-of-range input can be normalized instead of rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based page number; values below 1 mean page 1
    pub page_number: i64,

    /// Hits per page; values below 1 mean the configured default
    pub page_size: i64,

    /// Exact field to order by instead of relevance
    #[serde(default)]
    pub sort_field: Option<String>,

    /// Sort direction, ascending when unset
    #[serde(default)]
    pub sort_ascending: Option<bool>,
}

impl PageRequest {
    pub fn new(page_number: i64, page_size: i64) -> Self {
        Self {
            page_number,
            page_size,
            sort_field: None,
            sort_ascending: None,
        }
    }

    pub fn sorted_by(mut self, field: impl Into<String>, ascending: bool) -> Self {
        self.sort_field = Some(field.into());
        self.sort_ascending = Some(ascending);
        self
    }

    /// Clamp page number and size to usable values
    pub fn normalize(&self, default_page_size: usize) -> PageWindow {
        let page_number = usize::try_from(self.page_number).unwrap_or(0).max(1);
        let page_size = match usize::try_from(self.page_size) {
            Ok(size) if size >= 1 => size,
            _ => default_page_size.max(1),
        };
        PageWindow {
            page_number,
            page_size,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

/// A normalized page position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page_number: usize,
    pub page_size: usize,
}

impl PageWindow {
    /// Rank of the first hit on this page
    pub fn start(&self) -> usize {
        (self.page_number - 1).saturating_mul(self.page_size)
    }

    /// Ranks `[0, end)` must be retrieved to fill this page
    pub fn end(&self) -> usize {
        self.start().saturating_add(self.page_size)
    }
}

/// Number of pages for `total` hits; never less than 1
pub fn total_pages(total: u64, page_size: usize) -> u64 {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size as u64).max(1)
}

/// One materialized hit
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Stored fields of the document
    pub fields: FieldSet,

    /// Highlighted fragment, or the raw value, per highlight field
    pub highlights: HashMap<String, String>,

    /// Relevance score; 0 when the search is sorted by a field
    pub score: f32,
}

impl SearchHit {
    pub fn highlight(&self, field: &str) -> Option<&str> {
        self.highlights.get(field).map(String::as_str)
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub content: Vec<T>,
    pub total: u64,
    pub page_number: usize,
    pub page_size: usize,
    pub total_pages: u64,
}

impl<T> PageResult<T> {
    pub fn new(content: Vec<T>, total: u64, window: PageWindow) -> Self {
        Self {
            content,
            total,
            page_number: window.page_number,
            page_size: window.page_size,
            total_pages: total_pages(total, window.page_size),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn has_next(&self) -> bool {
        (self.page_number as u64) < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    /// Transform the content, keeping page metadata
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PageResult<U> {
        PageResult {
            content: self.content.into_iter().map(f).collect(),
            total: self.total,
            page_number: self.page_number,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_below_one_is_first_page() {
        for page in [-5, 0, 1] {
            let window = PageRequest::new(page, 10).normalize(15);
            assert_eq!(window.page_number, 1);
            assert_eq!(window.start(), 0);
        }
    }

    #[test]
    fn test_page_size_below_one_uses_default() {
        for size in [-1, 0] {
            assert_eq!(PageRequest::new(2, size).normalize(15).page_size, 15);
        }
        assert_eq!(PageRequest::new(2, 7).normalize(15).page_size, 7);
    }

    #[test]
    fn test_window_bounds() {
        let window = PageRequest::new(3, 10).normalize(15);
        assert_eq!(window.start(), 20);
        assert_eq!(window.end(), 30);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let window = PageRequest::new(i64::MAX, i64::MAX).normalize(15);
        assert_eq!(window.start(), usize::MAX);
        assert_eq!(window.end(), usize::MAX);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 15), 1);
        assert_eq!(total_pages(15, 15), 1);
        assert_eq!(total_pages(16, 15), 2);
        assert_eq!(total_pages(45, 15), 3);
        assert_eq!(total_pages(10, 0), 1);
    }

    #[test]
    fn test_empty_page_envelope() {
        let window = PageRequest::new(1, 15).normalize(15);
        let page: PageResult<SearchHit> = PageResult::new(Vec::new(), 0, window);
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_page_result_serializes_camel_case() {
        let window = PageRequest::new(2, 5).normalize(15);
        let page = PageResult::new(vec![1, 2], 7, window);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pageNumber"], 2);
        assert_eq!(json["pageSize"], 5);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["content"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_map_keeps_metadata() {
        let window = PageRequest::new(2, 5).normalize(15);
        let page = PageResult::new(vec![1, 2], 7, window).map(|n| n * 10);
        assert_eq!(page.content, vec![10, 20]);
        assert_eq!(page.total, 7);
        assert!(page.has_previous());
        assert!(!page.has_next());
    }
}
