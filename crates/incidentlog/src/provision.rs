//! First-run provisioning of the database file.
//!
//! The live database is copied from a seed exactly once. Every later launch
//! finds the file already in place and leaves it alone.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::storage::Storage;

/// Where a fresh database comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    /// Copy this file verbatim.
    File(PathBuf),
    /// Create an empty database with the records table.
    Empty,
}

impl Seed {
    /// Seed from an optional configured path.
    #[must_use]
    pub fn from_config(path: Option<PathBuf>) -> Self {
        path.map_or(Self::Empty, Self::File)
    }
}

/// What provisioning did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ProvisionOutcome {
    /// The database already existed; nothing was touched.
    AlreadyPresent,
    /// The seed file was copied into place.
    Copied {
        /// Bytes copied.
        bytes: u64,
    },
    /// An empty database was created.
    Created,
}

/// Make sure a database exists at `target`.
///
/// # Errors
///
/// Returns an error if the seed is missing, the parent directory cannot be
/// created, or the copy fails. Each failure is logged before it is returned.
pub async fn ensure_database(seed: &Seed, target: &Path) -> Result<ProvisionOutcome> {
    let result = provision(seed, target).await;
    match &result {
        Ok(ProvisionOutcome::AlreadyPresent) => {
            info!("Database already present at {}", target.display());
        }
        Ok(ProvisionOutcome::Copied { bytes }) => {
            info!("Copied seed database ({} bytes) to {}", bytes, target.display());
        }
        Ok(ProvisionOutcome::Created) => {
            info!("Created empty database at {}", target.display());
        }
        Err(e) => error!("Error loading database: {}", e),
    }
    result
}

async fn provision(seed: &Seed, target: &Path) -> Result<ProvisionOutcome> {
    // An unreadable target path is treated as absent; creating it will then
    // report the real problem.
    if tokio::fs::try_exists(target).await.unwrap_or(false) {
        return Ok(ProvisionOutcome::AlreadyPresent);
    }

    if let Seed::File(from) = seed {
        if !tokio::fs::try_exists(from).await? {
            return Err(Error::SeedMissing { path: from.clone() });
        }
    }

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
    }

    match seed {
        Seed::File(from) => {
            let bytes = tokio::fs::copy(from, target)
                .await
                .map_err(|source| Error::SeedCopy {
                    from: from.clone(),
                    to: target.to_path_buf(),
                    source,
                })?;
            Ok(ProvisionOutcome::Copied { bytes })
        }
        Seed::Empty => {
            let path = target.to_path_buf();
            tokio::task::spawn_blocking(move || Storage::open(path).map(drop))
                .await
                .map_err(|e| Error::internal(format!("provisioning task failed: {e}")))??;
            Ok(ProvisionOutcome::Created)
        }
    }
}

/// Application boot progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootState {
    /// Provisioning has not resolved yet.
    Loading,
    /// The database is in place.
    Ready(ProvisionOutcome),
    /// Provisioning failed; the record screen must not open.
    Failed(String),
}

impl BootState {
    /// Whether the record screen may be shown.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Text shown while the boot has not completed.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Loading => "Loading database...".to_string(),
            Self::Ready(_) => "Database ready".to_string(),
            Self::Failed(reason) => format!("Database unavailable: {reason}"),
        }
    }

    /// Run provisioning and report the resulting state.
    pub async fn boot(seed: &Seed, target: &Path) -> Self {
        match ensure_database(seed, target).await {
            Ok(outcome) => Self::Ready(outcome),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}
