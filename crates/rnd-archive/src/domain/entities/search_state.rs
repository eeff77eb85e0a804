//! SearchState - What the browse page is currently showing and asking for

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::SortKey;

/// Number of charts requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Mutable state of one browse page
///
/// Owned by a single [`crate::services::SearchController`]; nothing else
/// mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchState {
    pub query_text: String,
    /// Unique tags in selection order
    pub selected_tags: Vec<String>,
    pub sort_key: SortKey,
    /// 1-based index of the last page that was requested
    pub page_index: u32,
    page_size: u32,
    pub total_result_count: u64,
    pub is_fetch_in_flight: bool,
}

impl SearchState {
    /// Create an empty state; a zero page size is raised to one
    pub fn new(page_size: u32) -> Self {
        Self {
            query_text: String::new(),
            selected_tags: Vec::new(),
            sort_key: SortKey::default(),
            page_index: 1,
            page_size: page_size.max(1),
            total_result_count: 0,
            is_fetch_in_flight: false,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Zero-based offset of the current page
    pub fn offset(&self) -> u64 {
        u64::from(self.page_index.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Whether another page exists past the current one
    pub fn has_more(&self) -> bool {
        u64::from(self.page_index) * u64::from(self.page_size) < self.total_result_count
    }

    /// Select `tag`, or deselect it if it was already selected.
    ///
    /// Returns whether the tag is selected afterwards.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        if let Some(index) = self.selected_tags.iter().position(|t| t == tag) {
            self.selected_tags.remove(index);
            false
        } else {
            self.selected_tags.push(tag.to_string());
            true
        }
    }

    pub fn is_tag_selected(&self, tag: &str) -> bool {
        self.selected_tags.iter().any(|t| t == tag)
    }

    /// Back to an empty query with default sort.
    ///
    /// The page index and total describe what is rendered, so they are left
    /// for the next fresh fetch to replace.
    pub fn reset(&mut self) {
        self.query_text.clear();
        self.selected_tags.clear();
        self.sort_key = SortKey::default();
    }

    /// Request parameters for the current page
    pub fn to_query(&self) -> SearchQuery {
        SearchQuery {
            q: self.query_text.clone(),
            tags: self.selected_tags.clone(),
            limit: self.page_size,
            offset: self.offset(),
            sort: self.sort_key.clone(),
        }
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Parameters of one search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub tags: Vec<String>,
    pub limit: u32,
    pub offset: u64,
    pub sort: SortKey,
}

impl SearchQuery {
    /// Query-string pairs; `tags` is repeated once per tag
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(4 + self.tags.len());
        pairs.push(("q".to_string(), self.q.clone()));
        for tag in &self.tags {
            pairs.push(("tags".to_string(), tag.clone()));
        }
        pairs.push(("limit".to_string(), self.limit.to_string()));
        pairs.push(("offset".to_string(), self.offset.to_string()));
        pairs.push(("sort".to_string(), self.sort.to_string()));
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_is_zero_based() {
        let mut state = SearchState::new(50);
        assert_eq!(state.offset(), 0);
        state.page_index = 3;
        assert_eq!(state.offset(), 100);
    }

    #[test]
    fn test_has_more() {
        let mut state = SearchState::new(50);
        state.total_result_count = 120;
        assert!(state.has_more());
        state.page_index = 2;
        assert!(state.has_more());
        state.page_index = 3;
        assert!(!state.has_more());

        state.page_index = 1;
        state.total_result_count = 50;
        assert!(!state.has_more());
    }

    #[test]
    fn test_toggle_tag_preserves_order() {
        let mut state = SearchState::default();
        assert!(state.toggle_tag("a"));
        assert!(state.toggle_tag("b"));
        assert!(state.toggle_tag("c"));
        assert!(!state.toggle_tag("b"));
        assert_eq!(state.selected_tags, vec!["a", "c"]);

        assert!(state.toggle_tag("b"));
        assert_eq!(state.selected_tags, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_reset() {
        let mut state = SearchState::default();
        state.query_text = "sales".into();
        state.toggle_tag("Karte");
        state.sort_key = SortKey::TitleDesc;
        state.page_index = 4;

        state.reset();

        assert!(state.query_text.is_empty());
        assert!(state.selected_tags.is_empty());
        assert_eq!(state.sort_key, SortKey::PublishedDate);
        assert_eq!(state.page_index, 4);
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        assert_eq!(SearchState::new(0).page_size(), 1);
    }

    #[test]
    fn test_query_pairs_repeat_tags() {
        let mut state = SearchState::new(25);
        state.query_text = "wahl".into();
        state.toggle_tag("Politik");
        state.toggle_tag("Karte");
        state.page_index = 2;

        let pairs = state.to_query().to_pairs();
        let tags: Vec<_> = pairs
            .iter()
            .filter(|(k, _)| k == "tags")
            .map(|(_, v)| v.as_str())
            .collect();

        assert_eq!(tags, vec!["Politik", "Karte"]);
        assert!(pairs.contains(&("q".to_string(), "wahl".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "25".to_string())));
        assert!(pairs.contains(&("offset".to_string(), "25".to_string())));
        assert!(pairs.contains(&("sort".to_string(), "published_date".to_string())));
    }
}
