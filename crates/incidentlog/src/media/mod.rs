//! Media capture for the record form.
//!
//! The platform pieces (image library, file chooser, date widget, modal
//! alerts) are consumed through the traits in this module. The two adapters,
//! [`capture_photo`] and [`capture_audio`], sit on top of them and turn a pick
//! into a base64 payload for the draft.

pub mod desktop;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::MediaConfig;
use crate::error::{Error, Result};

pub use desktop::{ConsoleAlerts, FileDocumentPicker, FileImagePicker, TodayDatePicker};

/// Encode raw bytes the way payloads are stored.
#[must_use]
pub fn encode_payload(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode a stored payload back to raw bytes.
///
/// # Errors
///
/// Returns [`Error::Base64`] if the payload is not valid base64.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    Ok(base64::engine::general_purpose::STANDARD.decode(payload.trim())?)
}

/// Outcome of asking the platform for access to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// Access granted.
    Granted,
    /// Access refused by the user or the platform.
    Denied,
}

/// A blocking advisory shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    /// Dialog title.
    pub title: String,
    /// Dialog body.
    pub message: String,
}

impl Advisory {
    /// Build an advisory.
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Shown when a new record is saved with empty fields.
    #[must_use]
    pub fn incomplete_form() -> Self {
        Self::new("Warning!", "Please fill in every field.")
    }

    /// Shown when an update is attempted with empty fields.
    #[must_use]
    pub fn incomplete_update() -> Self {
        Self::new(
            "Warning!",
            "Please select a record and complete every field.",
        )
    }

    /// Shown when the image library permission is refused.
    #[must_use]
    pub fn permission_required() -> Self {
        Self::new(
            "Permission required",
            "Please allow access to the photo library to choose an image.",
        )
    }
}

/// Which files the document picker should offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFilter {
    /// Accepted lower-case extensions, without the dot.
    pub extensions: Vec<String>,
}

impl DocumentFilter {
    /// Filter for audio files using the configured extensions.
    #[must_use]
    pub fn audio(config: &MediaConfig) -> Self {
        Self {
            extensions: config.audio_extensions.clone(),
        }
    }

    /// Whether `path` has one of the accepted extensions.
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }
}

/// Result of one capture attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A base64 payload ready for the draft.
    Captured(String),
    /// The user dismissed the picker; the draft stays as it was.
    Cancelled,
    /// Permission was refused; the pick was aborted.
    Denied,
}

impl CaptureOutcome {
    /// Hand a captured payload to `set`; other outcomes leave the draft alone.
    ///
    /// Returns whether the setter ran.
    pub fn apply(self, set: impl FnOnce(String)) -> bool {
        match self {
            Self::Captured(payload) => {
                set(payload);
                true
            }
            Self::Cancelled | Self::Denied => false,
        }
    }
}

/// Permission-gated image library.
#[async_trait]
pub trait ImagePicker: Send + Sync {
    /// Ask for access to the image library.
    async fn request_permission(&self) -> Result<PermissionStatus>;

    /// Let the user choose an image; `None` on cancel.
    ///
    /// The image comes back already base64-encoded.
    async fn pick_image(&self) -> Result<Option<String>>;
}

/// File chooser used for audio clips.
#[async_trait]
pub trait DocumentPicker: Send + Sync {
    /// Let the user choose a file matching `filter`; `None` on cancel.
    async fn pick_document(&self, filter: &DocumentFilter) -> Result<Option<PathBuf>>;
}

/// Calendar date widget.
#[async_trait]
pub trait DatePicker: Send + Sync {
    /// Let the user choose a date starting from `initial`; `None` on dismiss.
    async fn pick_date(&self, initial: NaiveDate) -> Result<Option<NaiveDate>>;
}

/// Blocking advisory dialogs.
#[async_trait]
pub trait Alerts: Send + Sync {
    /// Show `advisory` and wait for the user to acknowledge it.
    async fn alert(&self, advisory: &Advisory);
}

/// Obtain a photo payload through the image picker.
///
/// A refused permission raises [`Advisory::permission_required`] and aborts
/// with [`CaptureOutcome::Denied`].
///
/// # Errors
///
/// Returns an error if the picker itself fails.
pub async fn capture_photo(
    picker: &dyn ImagePicker,
    alerts: &dyn Alerts,
    config: &MediaConfig,
) -> Result<CaptureOutcome> {
    if picker.request_permission().await? == PermissionStatus::Denied {
        warn!("Photo library permission denied");
        alerts.alert(&Advisory::permission_required()).await;
        return Ok(CaptureOutcome::Denied);
    }

    let Some(payload) = picker.pick_image().await? else {
        debug!("Image pick cancelled");
        return Ok(CaptureOutcome::Cancelled);
    };

    if payload.is_empty() {
        warn!("Image picker returned an empty payload; treating as cancelled");
        return Ok(CaptureOutcome::Cancelled);
    }

    let encoded_limit = encoded_len(config.max_photo_bytes);
    if payload.len() > encoded_limit {
        return Err(Error::media_rejected(
            "<image library>",
            format!("image exceeds {} bytes", config.max_photo_bytes),
        ));
    }

    info!("Captured photo ({} base64 chars)", payload.len());
    Ok(CaptureOutcome::Captured(payload))
}

/// Obtain an audio payload through the document picker.
///
/// The chosen file is read in full and base64-encoded.
///
/// # Errors
///
/// Returns an error if the picker fails, the file has an unexpected
/// extension, exceeds the size limit, or cannot be read.
pub async fn capture_audio(
    picker: &dyn DocumentPicker,
    config: &MediaConfig,
) -> Result<CaptureOutcome> {
    let filter = DocumentFilter::audio(config);
    let Some(path) = picker.pick_document(&filter).await? else {
        debug!("Audio pick cancelled");
        return Ok(CaptureOutcome::Cancelled);
    };

    if !filter.accepts(&path) {
        return Err(Error::media_rejected(&path, "not an audio file"));
    }

    let size = tokio::fs::metadata(&path).await?.len();
    if size > config.max_audio_bytes {
        return Err(Error::media_rejected(
            &path,
            format!("{size} bytes exceeds limit of {}", config.max_audio_bytes),
        ));
    }

    let bytes = tokio::fs::read(&path).await?;
    info!("Captured audio from {} ({} bytes)", path.display(), bytes.len());
    Ok(CaptureOutcome::Captured(encode_payload(&bytes)))
}

/// Length of the base64 encoding of `bytes` raw bytes.
fn encoded_len(bytes: u64) -> usize {
    let groups = bytes.div_ceil(3);
    usize::try_from(groups.saturating_mul(4)).unwrap_or(usize::MAX)
}
