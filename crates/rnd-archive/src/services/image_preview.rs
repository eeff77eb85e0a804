//! Admin image preview widgets
//!
//! Two independent handlers for the chart admin form:
//!
//! - [`FileInputPreview`] reacts to a file chosen in the `background_image`
//!   input and previews it through a local object URL.
//! - [`ClipboardPastePreview`] picks the first image out of a paste event,
//!   stores it as a data URL in the hidden `clipboard_image` field and
//!   previews it.
//!
//! Both show a warning that the record still has to be saved. Anything that
//! is not an image is left alone.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::errors::ArchiveError;

pub const BACKGROUND_IMAGE_FIELD: &str = "background_image";
pub const CLIPBOARD_IMAGE_FIELD: &str = "clipboard_image";

pub const PREVIEW_CAPTION: &str = "Image preview (not yet saved)";
pub const UNSAVED_WARNING: &str = "Click \"Save\" to keep the new image!";
pub const PASTE_HINT: &str = "Tip: you can paste an image from the clipboard here with Ctrl+V.";

pub const PREVIEW_MAX_HEIGHT: u32 = 200;
pub const PREVIEW_MAX_WIDTH: u32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// A new preview is on screen
    Rendered,
    /// Not an image; nothing changed
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    /// `blob:` or `data:` URL
    pub src: String,
    pub caption: String,
    pub max_height: u32,
    pub max_width: u32,
}

impl PreviewImage {
    fn new(src: String) -> Self {
        Self {
            src,
            caption: PREVIEW_CAPTION.to_string(),
            max_height: PREVIEW_MAX_HEIGHT,
            max_width: PREVIEW_MAX_WIDTH,
        }
    }
}

/// The readonly preview container next to an image field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewPane {
    pub image: Option<PreviewImage>,
    pub warning: Option<String>,
}

/// A file picked in a file input
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Arc<Vec<u8>>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: Arc::new(bytes),
        }
    }
}

fn is_image_mime(mime_type: &str) -> bool {
    mime_type.trim().to_ascii_lowercase().starts_with("image/")
}

// ============================================
// Object URLs
// ============================================

/// Local `blob:` references to in-memory file bytes
#[derive(Debug, Default)]
pub struct ObjectUrlRegistry {
    entries: HashMap<String, Arc<Vec<u8>>>,
}

impl ObjectUrlRegistry {
    pub fn create(&mut self, bytes: Arc<Vec<u8>>) -> String {
        let url = format!("blob:rnd-archive/{}", Uuid::new_v4());
        self.entries.insert(url.clone(), bytes);
        url
    }

    pub fn resolve(&self, url: &str) -> Option<&[u8]> {
        self.entries.get(url).map(|bytes| bytes.as_slice())
    }

    pub fn revoke(&mut self, url: &str) -> bool {
        self.entries.remove(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================
// File input preview
// ============================================

#[derive(Debug, Default)]
pub struct FileInputPreview {
    pane: PreviewPane,
    objects: ObjectUrlRegistry,
}

impl FileInputPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pane(&self) -> &PreviewPane {
        &self.pane
    }

    pub fn objects(&self) -> &ObjectUrlRegistry {
        &self.objects
    }

    /// Handle the input's change event; `None` means the selection was cleared
    pub fn on_change(&mut self, file: Option<SelectedFile>) -> PreviewOutcome {
        let Some(file) = file else {
            return PreviewOutcome::Skipped;
        };

        if !is_image_mime(&file.mime_type) {
            debug!(file = %file.name, mime = %file.mime_type, "Ignoring non-image selection");
            return PreviewOutcome::Skipped;
        }

        if let Some(previous) = self.pane.image.take() {
            self.objects.revoke(&previous.src);
        }

        let url = self.objects.create(Arc::clone(&file.bytes));
        debug!(file = %file.name, url = %url, size = file.bytes.len(), "Previewing selected image");

        self.pane.image = Some(PreviewImage::new(url));
        // The warning stays once shown
        if self.pane.warning.is_none() {
            self.pane.warning = Some(UNSAVED_WARNING.to_string());
        }

        PreviewOutcome::Rendered
    }
}

// ============================================
// Clipboard paste preview
// ============================================

#[derive(Debug, Clone)]
enum ClipboardSource {
    Inline(Vec<u8>),
    File(PathBuf),
}

/// One entry of a paste event's clipboard data
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    pub mime_type: String,
    source: ClipboardSource,
}

impl ClipboardItem {
    pub fn inline(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            source: ClipboardSource::Inline(bytes),
        }
    }

    /// Item whose contents are read from disk when the paste is handled
    pub fn from_file(mime_type: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            mime_type: mime_type.into(),
            source: ClipboardSource::File(path.into()),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::inline("text/plain", text.into().into_bytes())
    }

    fn is_image(&self) -> bool {
        self.mime_type.contains("image")
    }

    async fn read(&self) -> Result<Vec<u8>, ArchiveError> {
        match &self.source {
            ClipboardSource::Inline(bytes) => Ok(bytes.clone()),
            ClipboardSource::File(path) => Ok(tokio::fs::read(path).await?),
        }
    }
}

/// A paste event on the admin form
#[derive(Debug, Clone, Default)]
pub struct PasteEvent {
    items: Vec<ClipboardItem>,
    default_prevented: bool,
}

impl PasteEvent {
    pub fn new(items: Vec<ClipboardItem>) -> Self {
        Self {
            items,
            default_prevented: false,
        }
    }

    pub fn items(&self) -> &[ClipboardItem] {
        &self.items
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Default)]
pub struct ClipboardPastePreview {
    hidden_field: String,
    pane: PreviewPane,
}

impl ClipboardPastePreview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Help text shown under the thumbnail field
    pub fn paste_hint(&self) -> &'static str {
        PASTE_HINT
    }

    /// Value submitted as `clipboard_image`
    pub fn hidden_value(&self) -> &str {
        &self.hidden_field
    }

    pub fn pane(&self) -> &PreviewPane {
        &self.pane
    }

    /// Handle a paste event.
    ///
    /// Only the first image item is used. When there is none the event is
    /// not touched and the browser's normal paste goes ahead.
    pub async fn on_paste(&mut self, event: &mut PasteEvent) -> Result<PreviewOutcome, ArchiveError> {
        let Some(item) = event.items.iter().find(|item| item.is_image()).cloned() else {
            return Ok(PreviewOutcome::Skipped);
        };

        event.prevent_default();

        let bytes = item.read().await?;
        let data_url = encode_data_url(&item.mime_type, &bytes);
        debug!(mime = %item.mime_type, size = bytes.len(), "Pasted image captured");

        self.hidden_field = data_url.clone();
        self.pane.image = Some(PreviewImage::new(data_url));
        // At most one warning; the old one is replaced
        self.pane.warning = Some(UNSAVED_WARNING.to_string());

        Ok(PreviewOutcome::Rendered)
    }
}

/// `data:<mime>;base64,<payload>`
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}
