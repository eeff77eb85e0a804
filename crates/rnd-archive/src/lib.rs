//! RND Archive Client Library
//!
//! Headless client for the chart archive's browse/search surface.
//!
//! # Architecture
//!
//! The crate keeps the same layering as the rest of the archive tooling:
//!
//! - **Domain Layer** (`domain/`): Pure types without infrastructure dependencies
//!   - `entities/`: Result items, search state, toasts
//!   - `value_objects/`: Immutable value types (Severity, SortKey)
//!   - `errors`: The archive error taxonomy
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `search_api`: Where result pages come from
//!
//! - **Services** (`services/`): HTTP client, notifications, the search
//!   controller, rendering and the admin image preview widgets
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rnd_archive::{HttpClient, HttpClientConfig, NotificationCenter, SearchController};
//!
//! let notifications = Arc::new(NotificationCenter::default());
//! let client = HttpClient::new(HttpClientConfig::new("http://localhost:8000"), notifications.clone())?;
//! let handle = SearchController::new(Arc::new(client), notifications, Default::default()).spawn();
//! ```

pub mod domain;
pub mod ports;
pub mod services;

// Re-export commonly used types
pub use domain::{
    ArchiveError, ResultItem, SearchPage, SearchQuery, SearchState, Severity, SortKey,
    ToastMessage, DEFAULT_PAGE_SIZE,
};
pub use ports::SearchApi;
pub use services::{
    ChartCard, ClipboardItem, ClipboardPastePreview, ControllerConfig, FileInputPreview,
    HttpClient, HttpClientConfig, NotificationCenter, PasteEvent, PreviewOutcome, RequestOptions,
    ResultsGrid, ResultsView, SearchController, SearchEvent, SearchHandle, SelectedFile,
};
