//! Search API Port
//!
//! Abstract interface for fetching result pages.

use async_trait::async_trait;

use crate::domain::entities::{SearchPage, SearchQuery};
use crate::domain::errors::ArchiveError;

/// Source of search result pages
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Fetch one page of charts matching `query`
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, ArchiveError>;
}
