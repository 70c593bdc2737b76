//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Init command arguments.
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Seed database to copy on first run (overrides the configured seed)
    #[arg(short, long, value_name = "FILE")]
    pub seed: Option<PathBuf>,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Record id
    pub id: i64,

    /// Output as JSON (includes the base64 payloads)
    #[arg(short, long)]
    pub json: bool,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Incident date as YYYY-MM-DD (defaults to today)
    #[arg(short, long)]
    pub date: Option<String>,

    /// Short title
    #[arg(short, long)]
    pub title: String,

    /// Free-text description
    #[arg(short = 'D', long)]
    pub description: String,

    /// Image file to attach
    #[arg(short, long, value_name = "FILE")]
    pub photo: PathBuf,

    /// Audio file to attach
    #[arg(short, long, value_name = "FILE")]
    pub audio: PathBuf,
}

/// Edit command arguments; omitted fields keep their stored value.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Record id
    pub id: i64,

    /// New incident date as YYYY-MM-DD
    #[arg(short, long)]
    pub date: Option<String>,

    /// New title
    #[arg(short, long)]
    pub title: Option<String>,

    /// New description
    #[arg(short = 'D', long)]
    pub description: Option<String>,

    /// Replacement image file
    #[arg(short, long, value_name = "FILE")]
    pub photo: Option<PathBuf>,

    /// Replacement audio file
    #[arg(short, long, value_name = "FILE")]
    pub audio: Option<PathBuf>,
}

impl EditCommand {
    /// Whether any field was given.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.date.is_some()
            || self.title.is_some()
            || self.description.is_some()
            || self.photo.is_some()
            || self.audio.is_some()
    }
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Record id
    pub id: i64,
}

/// Clear command arguments.
#[derive(Debug, Args)]
pub struct ClearCommand {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Play command arguments.
#[derive(Debug, Args)]
pub struct PlayCommand {
    /// Record id
    pub id: i64,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
