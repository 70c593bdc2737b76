//! The records screen: list snapshot, draft form, and audio controls.
//!
//! [`RecordsScreen`] is the one place where the store, the form, the capture
//! adapters and the playback controller meet. Every user intent is a method
//! taking `&mut self`, so intents are handled one at a time.

use std::fmt;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::MediaConfig;
use crate::error::{Error, Result};
use crate::form::{FormMode, RecordForm, ValidationError};
use crate::media::{
    capture_audio, capture_photo, Advisory, Alerts, CaptureOutcome, DatePicker, DocumentPicker,
    ImagePicker,
};
use crate::playback::{AudioEngine, PlayControl, PlaybackController, SessionKey};
use crate::record::{self, Record};
use crate::storage::SharedStorage;

/// Platform capabilities the screen draws on.
#[derive(Clone)]
pub struct Providers {
    /// Image library.
    pub images: Arc<dyn ImagePicker>,
    /// File chooser for audio.
    pub documents: Arc<dyn DocumentPicker>,
    /// Date widget.
    pub dates: Arc<dyn DatePicker>,
    /// Modal advisories.
    pub alerts: Arc<dyn Alerts>,
}

impl fmt::Debug for Providers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Providers").finish_non_exhaustive()
    }
}

/// What a save did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new record was inserted with this id.
    Created(i64),
    /// The selected record was updated.
    Updated(i64),
    /// The selected record no longer exists; the draft was kept.
    NotFound(i64),
    /// The draft was incomplete; nothing was written.
    Rejected(ValidationError),
}

/// One entry of the rendered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordCard {
    /// Record id.
    pub id: i64,
    /// Incident date as `YYYY-MM-DD`.
    pub date: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Whether a photo is attached.
    pub has_photo: bool,
    /// Whether an audio clip is attached.
    pub has_audio: bool,
    /// Control to show next to the clip.
    pub control: PlayControl,
    /// Whether the form is editing this record.
    pub selected: bool,
}

/// Records list plus the add/edit form.
#[derive(Debug)]
pub struct RecordsScreen {
    storage: SharedStorage,
    providers: Providers,
    media: MediaConfig,
    form: RecordForm,
    playback: PlaybackController,
    records: Vec<Record>,
}

impl RecordsScreen {
    /// Build an unmounted screen with an empty snapshot.
    #[must_use]
    pub fn new(
        storage: SharedStorage,
        providers: Providers,
        engine: Arc<dyn AudioEngine>,
        media: MediaConfig,
    ) -> Self {
        Self {
            storage,
            providers,
            media,
            form: RecordForm::new(),
            playback: PlaybackController::new(engine),
            records: Vec::new(),
        }
    }

    /// Ensure the table exists and load the first snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be created or listed.
    pub async fn mount(&mut self) -> Result<()> {
        self.storage.run(|s| s.create_table()).await?;
        self.refresh().await
    }

    /// Replace the snapshot with the current table contents.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails; the previous snapshot is kept.
    pub async fn refresh(&mut self) -> Result<()> {
        match self.storage.run(|s| s.list()).await {
            Ok(records) => {
                debug!("Loaded {} records", records.len());
                self.records = records;
                Ok(())
            }
            Err(e) => {
                error!("Failed to load records: {}", e);
                Err(e)
            }
        }
    }

    /// The last loaded snapshot.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The draft form.
    #[must_use]
    pub fn form(&self) -> &RecordForm {
        &self.form
    }

    /// The draft form, for typing into fields.
    pub fn form_mut(&mut self) -> &mut RecordForm {
        &mut self.form
    }

    /// The playback controller.
    #[must_use]
    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    /// Select record `id` for editing.
    ///
    /// Returns `false` if the record is not in the snapshot. A draft preview
    /// or a session playing this record's clip is released.
    pub async fn edit(&mut self, id: i64) -> bool {
        let Some(record) = self.records.iter().find(|r| r.id == id) else {
            warn!("Record {} is not in the current list", id);
            return false;
        };
        self.form.edit(record);
        self.playback.unload_if(SessionKey::Draft).await;
        self.playback.unload_if(SessionKey::Record(id)).await;
        debug!("Editing record {}", id);
        true
    }

    /// Persist the draft.
    ///
    /// An incomplete draft raises an advisory and never reaches the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert, update, or the refresh after it fails.
    pub async fn save(&mut self) -> Result<SaveOutcome> {
        let mode = self.form.mode();
        let new_record = match self.form.validate() {
            Ok(new_record) => new_record,
            Err(e) => {
                warn!("Save rejected: {}", e);
                let advisory = match mode {
                    FormMode::Creating => Advisory::incomplete_form(),
                    FormMode::Editing(_) => Advisory::incomplete_update(),
                };
                self.providers.alerts.alert(&advisory).await;
                return Ok(SaveOutcome::Rejected(e));
            }
        };

        let outcome = match mode {
            FormMode::Creating => {
                let id = self
                    .storage
                    .run(move |s| s.insert(&new_record))
                    .await
                    .inspect_err(|e| error!("Failed to insert record: {}", e))?;
                info!("Created record {}", id);
                SaveOutcome::Created(id)
            }
            FormMode::Editing(id) => {
                let updated = self
                    .storage
                    .run(move |s| s.update(id, &new_record))
                    .await
                    .inspect_err(|e| error!("Failed to update record {}: {}", id, e))?;
                if !updated {
                    warn!("Record {} vanished before it could be updated", id);
                    return Ok(SaveOutcome::NotFound(id));
                }
                info!("Updated record {}", id);
                SaveOutcome::Updated(id)
            }
        };

        self.reset_form().await;
        self.refresh().await?;
        Ok(outcome)
    }

    /// Delete record `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete or the refresh after it fails.
    pub async fn delete(&mut self, id: i64) -> Result<bool> {
        let deleted = self
            .storage
            .run(move |s| s.delete(id))
            .await
            .inspect_err(|e| error!("Failed to delete record {}: {}", id, e))?;
        if deleted {
            self.playback.unload().await;
            info!("Deleted record {}", id);
        }
        if self.form.selected_id() == Some(id) {
            self.form.reset();
        }
        self.refresh().await?;
        Ok(deleted)
    }

    /// Delete every record.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete or the refresh after it fails.
    pub async fn delete_all(&mut self) -> Result<usize> {
        let removed = self
            .storage
            .run(|s| s.delete_all())
            .await
            .inspect_err(|e| error!("Failed to delete records: {}", e))?;
        self.playback.unload().await;
        if self.form.selected_id().is_some() {
            self.form.reset();
        }
        info!("Deleted {} records", removed);
        self.refresh().await?;
        Ok(removed)
    }

    /// Fill the draft photo from the image library.
    ///
    /// # Errors
    ///
    /// Returns an error if the picker fails or the image is rejected.
    pub async fn pick_photo(&mut self) -> Result<CaptureOutcome> {
        let outcome = capture_photo(
            self.providers.images.as_ref(),
            self.providers.alerts.as_ref(),
            &self.media,
        )
        .await?;
        outcome.clone().apply(|payload| self.form.set_photo(payload));
        Ok(outcome)
    }

    /// Fill the draft audio from the file chooser.
    ///
    /// # Errors
    ///
    /// Returns an error if the picker fails or the file is rejected.
    pub async fn pick_audio(&mut self) -> Result<CaptureOutcome> {
        let outcome = capture_audio(self.providers.documents.as_ref(), &self.media).await?;
        if let CaptureOutcome::Captured(payload) = &outcome {
            self.playback.unload_if(SessionKey::Draft).await;
            self.form.set_audio(payload.clone());
        }
        Ok(outcome)
    }

    /// Fill the draft date from the date widget.
    ///
    /// The widget opens on the draft date, or today if the draft has none.
    ///
    /// # Errors
    ///
    /// Returns an error if the picker fails.
    pub async fn pick_date(&mut self) -> Result<Option<NaiveDate>> {
        let initial =
            record::parse_date(self.form.date()).unwrap_or_else(|_| Local::now().date_naive());
        let picked = self.providers.dates.pick_date(initial).await?;
        if let Some(date) = picked {
            self.form.set_date_from(date);
        }
        Ok(picked)
    }

    /// Start playing the clip for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key` has no audio or playback fails.
    pub async fn play(&mut self, key: SessionKey) -> Result<()> {
        let payload = self.payload_for(key)?;
        self.playback
            .play(key, &payload)
            .await
            .inspect_err(|e| error!("Failed to play {}: {}", key, e))
    }

    /// Pause the playing clip, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to pause.
    pub async fn pause(&mut self) -> Result<()> {
        self.playback.pause().await
    }

    /// View model of the snapshot.
    #[must_use]
    pub fn cards(&self) -> Vec<RecordCard> {
        let selected = self.form.selected_id();
        self.records
            .iter()
            .map(|r| RecordCard {
                id: r.id,
                date: record::format_date(r.date),
                title: r.title.clone(),
                description: r.description.clone(),
                has_photo: r.has_photo(),
                has_audio: r.has_audio(),
                control: self.playback.control_for(SessionKey::Record(r.id)),
                selected: selected == Some(r.id),
            })
            .collect()
    }

    /// Control to show for the draft audio preview.
    #[must_use]
    pub fn draft_control(&self) -> PlayControl {
        self.playback.control_for(SessionKey::Draft)
    }

    /// Release the audio session when the screen goes away.
    pub async fn unmount(&mut self) {
        if let Some(key) = self.playback.unload().await {
            debug!("Released {} on unmount", key);
        }
    }

    /// Clear the draft and release whatever clip is loaded.
    pub async fn reset_form(&mut self) {
        self.form.reset();
        self.playback.unload().await;
    }

    fn payload_for(&self, key: SessionKey) -> Result<String> {
        let payload = match key {
            SessionKey::Draft => self.form.audio(),
            SessionKey::Record(id) => self
                .records
                .iter()
                .find(|r| r.id == id)
                .and_then(|r| r.audio.as_deref()),
        };
        payload
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .ok_or_else(|| Error::NoAudio(key.to_string()))
    }
}
