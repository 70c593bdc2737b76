//! Desktop capability providers.
//!
//! On the command line there is no gallery or file dialog: the "pick" is a
//! path the user already named. These providers adapt such paths to the
//! picker traits so the same capture adapters run everywhere.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tracing::warn;

use super::{
    encode_payload, Advisory, Alerts, DatePicker, DocumentFilter, DocumentPicker, ImagePicker,
    PermissionStatus,
};
use crate::error::{Error, Result};

/// Image picker backed by a file path; no path means the user cancelled.
#[derive(Debug, Clone, Default)]
pub struct FileImagePicker {
    source: Option<PathBuf>,
    extensions: Vec<String>,
}

impl FileImagePicker {
    /// Picker that yields `source` for images with one of `extensions`.
    #[must_use]
    pub fn new(source: Option<PathBuf>, extensions: Vec<String>) -> Self {
        Self { source, extensions }
    }
}

#[async_trait]
impl ImagePicker for FileImagePicker {
    async fn request_permission(&self) -> Result<PermissionStatus> {
        let Some(path) = &self.source else {
            return Ok(PermissionStatus::Granted);
        };
        match tokio::fs::File::open(path).await {
            Ok(_) => Ok(PermissionStatus::Granted),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => Ok(PermissionStatus::Denied),
            Err(e) => Err(e.into()),
        }
    }

    async fn pick_image(&self) -> Result<Option<String>> {
        let Some(path) = &self.source else {
            return Ok(None);
        };
        let filter = DocumentFilter {
            extensions: self.extensions.clone(),
        };
        if !filter.accepts(path) {
            return Err(Error::media_rejected(path, "not an image file"));
        }
        let bytes = tokio::fs::read(path).await?;
        Ok(Some(encode_payload(&bytes)))
    }
}

/// Document picker backed by a file path; no path means the user cancelled.
#[derive(Debug, Clone, Default)]
pub struct FileDocumentPicker {
    source: Option<PathBuf>,
}

impl FileDocumentPicker {
    /// Picker that yields `source`.
    #[must_use]
    pub fn new(source: Option<PathBuf>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl DocumentPicker for FileDocumentPicker {
    async fn pick_document(&self, _filter: &DocumentFilter) -> Result<Option<PathBuf>> {
        Ok(self.source.clone())
    }
}

/// Date picker that always answers with today's local date.
#[derive(Debug, Clone, Copy, Default)]
pub struct TodayDatePicker;

#[async_trait]
impl DatePicker for TodayDatePicker {
    async fn pick_date(&self, _initial: NaiveDate) -> Result<Option<NaiveDate>> {
        Ok(Some(Local::now().date_naive()))
    }
}

/// Advisories printed to standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleAlerts;

#[async_trait]
impl Alerts for ConsoleAlerts {
    async fn alert(&self, advisory: &Advisory) {
        warn!("{}: {}", advisory.title, advisory.message);
        eprintln!("{}: {}", advisory.title, advisory.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaConfig;
    use crate::media::decode_payload;

    fn image_picker(source: Option<PathBuf>) -> FileImagePicker {
        FileImagePicker::new(source, MediaConfig::default().image_extensions)
    }

    #[tokio::test]
    async fn test_file_image_picker_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let picker = image_picker(Some(path));
        assert_eq!(
            picker.request_permission().await.unwrap(),
            PermissionStatus::Granted
        );
        let payload = picker.pick_image().await.unwrap().unwrap();
        assert_eq!(decode_payload(&payload).unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_file_image_picker_without_source_cancels() {
        let picker = image_picker(None);
        assert_eq!(
            picker.request_permission().await.unwrap(),
            PermissionStatus::Granted
        );
        assert!(picker.pick_image().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_image_picker_missing_file_errors() {
        let picker = image_picker(Some(PathBuf::from("/nonexistent/scene.png")));
        assert!(picker.request_permission().await.is_err());
    }

    #[tokio::test]
    async fn test_file_image_picker_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "text").unwrap();

        let err = image_picker(Some(path)).pick_image().await.unwrap_err();
        assert!(matches!(err, Error::MediaRejected { .. }));
    }

    #[tokio::test]
    async fn test_file_document_picker() {
        let filter = DocumentFilter::audio(&MediaConfig::default());
        let picker = FileDocumentPicker::new(Some(PathBuf::from("/tmp/a.mp3")));
        assert_eq!(
            picker.pick_document(&filter).await.unwrap(),
            Some(PathBuf::from("/tmp/a.mp3"))
        );
        assert!(FileDocumentPicker::default()
            .pick_document(&filter)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_today_date_picker() {
        let initial = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let picked = TodayDatePicker.pick_date(initial).await.unwrap().unwrap();
        assert!(picked > initial);
    }
}
