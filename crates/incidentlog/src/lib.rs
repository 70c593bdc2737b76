//! `incidentlog` - A local incident journal with photo and audio notes
//!
//! Each record carries a date, title, description, photo and audio clip and
//! is kept in a single-table SQLite database. The [`screen::RecordsScreen`]
//! drives the add/edit form and the list; pickers, alerts and the audio
//! output are reached through the traits in [`media`] and [`playback`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod about;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod media;
pub mod playback;
pub mod provision;
pub mod record;
pub mod screen;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use error::{Error, Result};
pub use form::{FormMode, RecordForm, ValidationError};
pub use logging::init_logging;
pub use provision::{ensure_database, BootState, ProvisionOutcome, Seed};
pub use record::{NewRecord, Record};
pub use screen::{Providers, RecordCard, RecordsScreen, SaveOutcome};
pub use storage::{SharedStorage, Storage, StorageStats};
