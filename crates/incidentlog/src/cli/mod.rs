//! Command-line interface for incidentlog.
//!
//! This module provides the CLI structure and command handlers for the
//! `inclog` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ClearCommand, ConfigCommand, DeleteCommand, EditCommand, InitCommand,
    ListCommand, PlayCommand, ShowCommand, StatusCommand,
};

/// inclog - Keep a local journal of incidents
///
/// Each record holds a date, a title, a description, a photo and an audio
/// note, stored in a SQLite database on this machine.
#[derive(Debug, Parser)]
#[command(name = "inclog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Provision the database (copies the seed on first run)
    Init(InitCommand),

    /// List all records
    List(ListCommand),

    /// Show one record
    Show(ShowCommand),

    /// Add a record
    Add(AddCommand),

    /// Edit a record
    Edit(EditCommand),

    /// Delete a record
    Delete(DeleteCommand),

    /// Delete every record
    Clear(ClearCommand),

    /// Play a record's audio note
    Play(PlayCommand),

    /// Show database status
    Status(StatusCommand),

    /// About this application
    About,

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "inclog");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        use crate::logging::Verbosity;

        assert_eq!(parse(&["inclog", "-q", "list"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["inclog", "list"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["inclog", "-v", "list"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["inclog", "-vv", "list"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["inclog", "status", "-c", "/custom/config.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(matches!(cli.command, Command::Status(StatusCommand { json: false })));
    }

    #[test]
    fn test_parse_init_with_seed() {
        let cli = parse(&["inclog", "init", "--seed", "/assets/911.db"]);
        match cli.command {
            Command::Init(cmd) => assert_eq!(cmd.seed, Some(PathBuf::from("/assets/911.db"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_add() {
        let cli = parse(&[
            "inclog",
            "add",
            "--title",
            "Broken window",
            "-D",
            "Rear entrance",
            "--photo",
            "window.jpg",
            "--audio",
            "note.m4a",
        ]);
        match cli.command {
            Command::Add(cmd) => {
                assert!(cmd.date.is_none());
                assert_eq!(cmd.title, "Broken window");
                assert_eq!(cmd.description, "Rear entrance");
                assert_eq!(cmd.photo, PathBuf::from("window.jpg"));
                assert_eq!(cmd.audio, PathBuf::from("note.m4a"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_add_requires_media() {
        let result = Cli::try_parse_from(["inclog", "add", "--title", "t", "-D", "d"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_edit_partial() {
        let cli = parse(&["inclog", "edit", "7", "--title", "Updated"]);
        match cli.command {
            Command::Edit(cmd) => {
                assert_eq!(cmd.id, 7);
                assert_eq!(cmd.title.as_deref(), Some("Updated"));
                assert!(cmd.audio.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_simple_commands() {
        assert!(matches!(
            parse(&["inclog", "delete", "3"]).command,
            Command::Delete(DeleteCommand { id: 3 })
        ));
        assert!(matches!(
            parse(&["inclog", "clear", "--yes"]).command,
            Command::Clear(ClearCommand { yes: true })
        ));
        assert!(matches!(
            parse(&["inclog", "play", "2"]).command,
            Command::Play(PlayCommand { id: 2 })
        ));
        assert!(matches!(parse(&["inclog", "about"]).command, Command::About));
        assert!(matches!(
            parse(&["inclog", "config", "path"]).command,
            Command::Config(ConfigCommand::Path)
        ));
    }

    #[test]
    fn test_parse_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["inclog", "show", "abc"]).is_err());
    }
}
