//! Collection folder commands.

use std::path::PathBuf;
use tokio::runtime::Runtime;

use super::open_library;
use crate::config::Config;

/// Add a folder to the collection
pub fn cmd_folder_add(
    rt: &Runtime,
    config: &Config,
    db: Option<&PathBuf>,
    path: &PathBuf,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let library = open_library(config, db).await?;

        // Store the absolute path so later walks don't depend on the cwd
        let root = std::path::absolute(path)?;
        if !root.is_dir() {
            tracing::warn!(target: "cli::folder", path = %root.display(), "Folder does not exist yet");
        }

        let id = library.add_folder(&root.to_string_lossy()).await?;
        println!("Added folder {} (id {})", root.display(), id);
        Ok(())
    })
}

/// List collection folders
pub fn cmd_folder_list(rt: &Runtime, config: &Config, db: Option<&PathBuf>) -> anyhow::Result<()> {
    rt.block_on(async {
        let library = open_library(config, db).await?;
        let folders = library.folders().await?;

        if folders.is_empty() {
            println!("No folders. Add one with `folder add <path>`.");
            return Ok(());
        }

        for folder in folders {
            let marker = if folder.path_buf().is_dir() { " " } else { "!" };
            let hidden = if folder.show_in_collection { "" } else { " (hidden)" };
            println!("{} {:>4}  {}{}", marker, folder.id, folder.path, hidden);
        }
        Ok(())
    })
}

/// Remove a folder from the collection
pub fn cmd_folder_remove(
    rt: &Runtime,
    config: &Config,
    db: Option<&PathBuf>,
    path: &PathBuf,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let library = open_library(config, db).await?;

        // Try the path as given first, then its absolute form
        let given = path.to_string_lossy().into_owned();
        let removed = library.remove_folder(&given).await?
            || library
                .remove_folder(&std::path::absolute(path)?.to_string_lossy())
                .await?;

        if removed {
            println!("Removed folder {}", path.display());
        } else {
            anyhow::bail!("Folder not found: {}", path.display());
        }
        Ok(())
    })
}
