//! ResultItem - A chart as listed by the search endpoint
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One chart in a result page
///
/// Field names follow the search endpoint's JSON (`chart_id`, `thumbnail`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    #[serde(rename = "chart_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "thumbnail", default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Null for charts that were never published
    #[serde(default)]
    pub published_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_archived: bool,
}

impl ResultItem {
    /// Create a minimal item; the remaining fields start empty
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            notes: None,
            thumbnail_url: None,
            tags: Vec::new(),
            published_date: None,
            is_published: false,
            is_archived: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_published_date(mut self, date: DateTime<Utc>) -> Self {
        self.published_date = Some(date);
        self.is_published = true;
        self
    }

    pub fn archived(mut self) -> Self {
        self.is_archived = true;
        self
    }

    /// Description, treating blank text as absent
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub total_count: u64,
    #[serde(default)]
    pub results: Vec<ResultItem>,
    /// Echo of the requested limit, when the server sends it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Echo of the requested offset, when the server sends it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl SearchPage {
    pub fn new(total_count: u64, results: Vec<ResultItem>) -> Self {
        Self {
            total_count,
            results,
            limit: None,
            offset: None,
        }
    }
}
