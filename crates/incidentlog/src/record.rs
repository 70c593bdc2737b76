//! Core record types for incidentlog.
//!
//! A [`Record`] is one incident entry as it lives in the database. A
//! [`NewRecord`] is the validated set of mutable fields handed to the store
//! for inserts and updates; it can only be built with every field present.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Text format of the `date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns the chrono parse error if `text` is not a valid calendar date.
pub fn parse_date(text: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
}

/// Format a date as stored in the `date` column.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// A stored incident entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier assigned by the store on insert.
    pub id: i64,

    /// Day the incident happened.
    pub date: NaiveDate,

    /// Short title.
    pub title: String,

    /// Free-text description.
    pub description: String,

    /// Base64-encoded image, if one was captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,

    /// Base64-encoded audio clip, if one was captured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

impl Record {
    /// Whether this record has a playable audio payload.
    #[must_use]
    pub fn has_audio(&self) -> bool {
        self.audio.as_deref().is_some_and(|a| !a.is_empty())
    }

    /// Whether this record has a photo payload.
    #[must_use]
    pub fn has_photo(&self) -> bool {
        self.photo.as_deref().is_some_and(|p| !p.is_empty())
    }

    /// The mutable fields of this record, if all of them are present.
    #[must_use]
    pub fn to_new_record(&self) -> Option<NewRecord> {
        Some(NewRecord {
            date: self.date,
            title: self.title.clone(),
            description: self.description.clone(),
            photo: self.photo.clone().filter(|p| !p.is_empty())?,
            audio: self.audio.clone().filter(|a| !a.is_empty())?,
        })
    }
}

/// The five mutable fields of a record, all required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    /// Day the incident happened.
    pub date: NaiveDate,
    /// Short title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Base64-encoded image.
    pub photo: String,
    /// Base64-encoded audio clip.
    pub audio: String,
}

impl NewRecord {
    /// The date in its stored text form.
    #[must_use]
    pub fn date_text(&self) -> String {
        format_date(self.date)
    }

    /// Attach an id, producing the record as it will read back from storage.
    #[must_use]
    pub fn with_id(self, id: i64) -> Record {
        Record {
            id,
            date: self.date,
            title: self.title,
            description: self.description,
            photo: Some(self.photo),
            audio: Some(self.audio),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewRecord {
        NewRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            title: "T1".to_string(),
            description: "D1".to_string(),
            photo: "cGhvdG8=".to_string(),
            audio: "YXVkaW8=".to_string(),
        }
    }

    #[test]
    fn test_parse_and_format_date() {
        let date = parse_date("2024-01-01").unwrap();
        assert_eq!(format_date(date), "2024-01-01");
        assert_eq!(parse_date(" 2024-02-29 ").unwrap().to_string(), "2024-02-29");
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        assert!(parse_date("01/01/2024").is_err());
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_with_id() {
        let record = sample().with_id(3);
        assert_eq!(record.id, 3);
        assert_eq!(record.title, "T1");
        assert!(record.has_audio());
        assert!(record.has_photo());
    }

    #[test]
    fn test_to_new_record_requires_media() {
        let mut record = sample().with_id(1);
        assert_eq!(record.to_new_record(), Some(sample()));

        record.audio = None;
        assert!(record.to_new_record().is_none());

        record.audio = Some(String::new());
        assert!(!record.has_audio());
        assert!(record.to_new_record().is_none());
    }

    #[test]
    fn test_date_text() {
        assert_eq!(sample().date_text(), "2024-01-01");
    }

    #[test]
    fn test_record_serialization_skips_missing_media() {
        let mut record = sample().with_id(1);
        record.photo = None;
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("photo"));
        assert!(json.contains("\"date\":\"2024-01-01\""));

        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
