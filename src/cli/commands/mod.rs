//! CLI command definitions and dispatch.
//!
//! Each subcommand group lives in its own submodule:
//! - `folder`: Collection folder management
//! - `scan`: Directory walks, indexable paths and the staleness check
//! - `index`: Reconciling the database with the files on disk
//! - `settings`: Showing and creating the config file

mod folder;
mod index;
mod scan;
mod settings;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::db::SqliteLibrary;
use crate::fs::OsFileSystem;
use crate::scanner::IndexablePathFetcher;

pub use folder::{cmd_folder_add, cmd_folder_list, cmd_folder_remove};
pub use index::cmd_index;
pub use scan::{cmd_check, cmd_paths, cmd_walk};
pub use settings::{cmd_config_init, cmd_config_show};

/// Collection indexer CLI
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Database path (defaults to the configured or OS data location)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage collection folders
    Folder {
        #[command(subcommand)]
        action: FolderAction,
    },
    /// List every file under a directory, reporting errors as they occur
    Walk {
        /// Directory to walk
        path: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List indexable audio files across all collection folders
    Paths,
    /// Check whether the collection needs a new index pass
    Check {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Bring the database in line with the files on disk
    Index {
        /// Dry run - show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Show or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Folder subcommands
#[derive(Subcommand)]
pub enum FolderAction {
    /// Add a folder to the collection
    Add {
        /// Folder root
        path: PathBuf,
    },
    /// List collection folders
    List,
    /// Remove a folder from the collection
    Remove {
        /// Folder root, as added
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let config = config::load();

    match &cli.command {
        Commands::Folder { action } => match action {
            FolderAction::Add { path } => cmd_folder_add(&rt, &config, cli.db.as_ref(), path),
            FolderAction::List => cmd_folder_list(&rt, &config, cli.db.as_ref()),
            FolderAction::Remove { path } => {
                cmd_folder_remove(&rt, &config, cli.db.as_ref(), path)
            }
        },
        Commands::Walk { path, format } => cmd_walk(&config, path, *format),
        Commands::Paths => cmd_paths(&rt, &config, cli.db.as_ref()),
        Commands::Check { format } => cmd_check(&rt, &config, cli.db.as_ref(), *format),
        Commands::Index { dry_run } => cmd_index(&rt, &config, cli.db.as_ref(), *dry_run),
        Commands::Config { action } => match action {
            ConfigAction::Show => cmd_config_show(&config),
            ConfigAction::Init { force } => cmd_config_init(*force),
        },
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Resolve the database path from `--db` or the config.
pub(crate) fn database_path(config: &Config, db: Option<&PathBuf>) -> PathBuf {
    db.cloned()
        .unwrap_or_else(|| config.database.resolved_path())
}

/// Open the collection database, creating its directory if needed.
pub(crate) async fn open_library(
    config: &Config,
    db: Option<&PathBuf>,
) -> anyhow::Result<Arc<SqliteLibrary>> {
    let path = database_path(config, db);
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let library = SqliteLibrary::open(&path).await?;
    tracing::debug!(target: "db", path = %path.display(), "Database opened");
    Ok(Arc::new(library))
}

pub(crate) fn file_system(config: &Config) -> Arc<OsFileSystem> {
    Arc::new(OsFileSystem::new(config.library.follow_symlinks))
}

/// Fetcher over the real filesystem and the folders stored in `library`.
pub(crate) fn fetcher(config: &Config, library: &Arc<SqliteLibrary>) -> IndexablePathFetcher {
    IndexablePathFetcher::new(
        file_system(config),
        library.clone(),
        config.library.extensions(),
    )
}
