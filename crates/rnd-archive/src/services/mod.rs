//! Services
//!
//! HTTP access, notifications, the search controller and the
//! admin image preview widgets.

pub mod debounce;
pub mod format;
pub mod http_client;
pub mod image_preview;
pub mod notifications;
pub mod render;
pub mod search_controller;

pub use debounce::Debouncer;
pub use http_client::{HttpClient, HttpClientConfig, RequestOptions};
pub use image_preview::{
    ClipboardItem, ClipboardPastePreview, FileInputPreview, PasteEvent, PreviewImage,
    PreviewOutcome, PreviewPane, SelectedFile,
};
pub use notifications::NotificationCenter;
pub use render::{ChartCard, ResultsGrid, ResultsView};
pub use search_controller::{ControllerConfig, SearchController, SearchEvent, SearchHandle};
