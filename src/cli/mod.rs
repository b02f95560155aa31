//! Command-line interface for the collection indexer.
//!
//! Provides commands for managing collection folders, walking directories,
//! checking whether the collection is outdated, running index passes and
//! managing the config file.

mod commands;

pub use commands::{Cli, Commands, ConfigAction, FolderAction, OutputFormat, run_command};
