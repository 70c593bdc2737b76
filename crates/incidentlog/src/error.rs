//! Error types for incidentlog.
//!
//! Every fallible operation in the crate returns [`Result`]. Provisioning,
//! schema, and statement failures are logged where they happen and then
//! propagated so callers can tell "the query failed" apart from "nothing
//! changed".

use std::path::PathBuf;
use thiserror::Error;

use crate::form::ValidationError;

/// The main error type for incidentlog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Provisioning Errors ===
    /// The configured seed database does not exist.
    #[error("seed database not found at {path}")]
    SeedMissing {
        /// Path that was expected to hold the seed.
        path: PathBuf,
    },

    /// Copying the seed database into place failed.
    #[error("failed to copy seed database from {from} to {to}: {source}")]
    SeedCopy {
        /// Seed file.
        from: PathBuf,
        /// Destination database file.
        to: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// Creating the records table failed.
    #[error("failed to create records table: {0}")]
    SchemaCreate(#[source] rusqlite::Error),

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// No record exists with the given id.
    #[error("record {0} not found")]
    RecordNotFound(i64),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Form & Media Errors ===
    /// The draft is incomplete or malformed.
    #[error("invalid draft: {0}")]
    Validation(#[from] ValidationError),

    /// Required platform permission is missing.
    #[error("missing permission: {permission}")]
    PermissionDenied {
        /// Name of the required permission.
        permission: String,
    },

    /// A media file was rejected before encoding.
    #[error("media rejected ({path}): {reason}")]
    MediaRejected {
        /// The offending file.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// A base64 payload could not be decoded.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    // === Playback Errors ===
    /// The audio engine could not load or play a clip.
    #[error("playback error: {0}")]
    Playback(String),

    /// The requested record has no audio attached.
    #[error("no audio to play for {0}")]
    NoAudio(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for incidentlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new playback error.
    #[must_use]
    pub fn playback(message: impl Into<String>) -> Self {
        Self::Playback(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a permission denied error.
    #[must_use]
    pub fn permission_denied(permission: impl Into<String>) -> Self {
        Self::PermissionDenied {
            permission: permission.into(),
        }
    }

    /// Create a media rejection error.
    #[must_use]
    pub fn media_rejected(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MediaRejected {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error is a permission issue.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Check if this error came from provisioning the database file.
    #[must_use]
    pub fn is_provisioning_error(&self) -> bool {
        matches!(
            self,
            Self::SeedMissing { .. } | Self::SeedCopy { .. } | Self::DirectoryCreate { .. }
        )
    }
}
