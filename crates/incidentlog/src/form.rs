//! The record form: a draft of one record plus the create/edit mode.
//!
//! The form is `Creating` while no record is selected and `Editing(id)` once
//! [`RecordForm::edit`] has loaded a stored record. Validation is the only way
//! to turn a draft into a [`NewRecord`], so an incomplete draft can never reach
//! the store.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::record::{self, NewRecord, Record};

/// Which intent a save will carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "id")]
pub enum FormMode {
    /// No record selected; saving inserts.
    Creating,
    /// The record with this id is selected; saving updates it.
    Editing(i64),
}

/// A draft field that validation can complain about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Incident date.
    Date,
    /// Title.
    Title,
    /// Description.
    Description,
    /// Photo payload.
    Photo,
    /// Audio payload.
    Audio,
}

impl Field {
    /// Every field, in form order.
    pub const ALL: [Field; 5] = [
        Field::Date,
        Field::Title,
        Field::Description,
        Field::Photo,
        Field::Audio,
    ];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date => write!(f, "date"),
            Self::Title => write!(f, "title"),
            Self::Description => write!(f, "description"),
            Self::Photo => write!(f, "photo"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// Why a draft cannot be saved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields are empty.
    #[error("missing fields: {}", join_fields(.0))]
    Missing(Vec<Field>),

    /// The date is present but not `YYYY-MM-DD`.
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

impl ValidationError {
    /// The missing fields, if that is the failure.
    #[must_use]
    pub fn missing(&self) -> &[Field] {
        match self {
            Self::Missing(fields) => fields,
            Self::InvalidDate(_) => &[],
        }
    }
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Draft state for the add/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordForm {
    id_to_update: Option<i64>,
    date: String,
    title: String,
    description: String,
    photo: Option<String>,
    audio: Option<String>,
}

impl RecordForm {
    /// An empty form in `Creating` mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> FormMode {
        match self.id_to_update {
            Some(id) => FormMode::Editing(id),
            None => FormMode::Creating,
        }
    }

    /// Id of the selected record, if editing.
    #[must_use]
    pub fn selected_id(&self) -> Option<i64> {
        self.id_to_update
    }

    /// Select a stored record for editing and load its fields into the draft.
    pub fn edit(&mut self, record: &Record) {
        self.id_to_update = Some(record.id);
        self.date = record::format_date(record.date);
        self.title.clone_from(&record.title);
        self.description.clone_from(&record.description);
        self.photo.clone_from(&record.photo);
        self.audio.clone_from(&record.audio);
    }

    /// Clear every draft field and return to `Creating`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Draft date text.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Set the date from typed text.
    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = date.into();
    }

    /// Set the date from a picker result.
    pub fn set_date_from(&mut self, date: NaiveDate) {
        self.date = record::format_date(date);
    }

    /// Draft title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Draft description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Draft photo payload.
    #[must_use]
    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    /// Set the photo payload (base64).
    pub fn set_photo(&mut self, photo: impl Into<String>) {
        self.photo = Some(photo.into());
    }

    /// Draft audio payload.
    #[must_use]
    pub fn audio(&self) -> Option<&str> {
        self.audio.as_deref()
    }

    /// Set the audio payload (base64).
    pub fn set_audio(&mut self, audio: impl Into<String>) {
        self.audio = Some(audio.into());
    }

    /// Whether any field holds a value.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        *self != Self::default()
    }

    /// Form heading for the current mode.
    #[must_use]
    pub fn heading(&self) -> &'static str {
        match self.mode() {
            FormMode::Creating => "Add incident",
            FormMode::Editing(_) => "Edit incident",
        }
    }

    /// Label of the submit action for the current mode.
    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        match self.mode() {
            FormMode::Creating => "Save",
            FormMode::Editing(_) => "Update",
        }
    }

    /// Check the draft and build the record to persist.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Missing`] listing every empty field, or
    /// [`ValidationError::InvalidDate`] if the date does not parse.
    pub fn validate(&self) -> Result<NewRecord, ValidationError> {
        let missing: Vec<Field> = Field::ALL
            .into_iter()
            .filter(|field| self.is_blank(*field))
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::Missing(missing));
        }

        let date = record::parse_date(&self.date)
            .map_err(|_| ValidationError::InvalidDate(self.date.clone()))?;

        Ok(NewRecord {
            date,
            title: self.title.clone(),
            description: self.description.clone(),
            photo: self.photo.clone().unwrap_or_default(),
            audio: self.audio.clone().unwrap_or_default(),
        })
    }

    fn is_blank(&self, field: Field) -> bool {
        match field {
            Field::Date => self.date.trim().is_empty(),
            Field::Title => self.title.is_empty(),
            Field::Description => self.description.is_empty(),
            Field::Photo => self.photo.as_deref().map_or(true, str::is_empty),
            Field::Audio => self.audio.as_deref().map_or(true, str::is_empty),
        }
    }
}
