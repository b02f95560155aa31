//! Walk, path listing and staleness check commands.

use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::info;

use super::{OutputFormat, fetcher, file_system, open_library};
use crate::config::Config;
use crate::indexing::CollectionChecker;
use crate::scanner::DirectoryWalker;
use crate::ticks;

/// Walk a directory and print every file found
pub fn cmd_walk(config: &Config, path: &PathBuf, format: OutputFormat) -> anyhow::Result<()> {
    let walker = DirectoryWalker::new(file_system(config));
    let result = walker.get_files_in_directory(path);

    info!(
        target: "scanner::walker",
        root = %path.display(),
        files = result.file_paths.len(),
        errors = result.errors.len(),
        "Walk complete"
    );

    match format {
        OutputFormat::Json => {
            let errors: Vec<String> = result.errors.iter().map(|e| e.to_string()).collect();
            let report = serde_json::json!({
                "files": result.file_paths,
                "errors": errors,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            for file in &result.file_paths {
                println!("{}", file.display());
            }
            for error in &result.errors {
                eprintln!("Error: {}", error);
            }
            println!(
                "\n{} files, {} errors",
                result.file_paths.len(),
                result.errors.len()
            );
        }
    }
    Ok(())
}

/// List indexable paths across all collection folders
pub fn cmd_paths(rt: &Runtime, config: &Config, db: Option<&PathBuf>) -> anyhow::Result<()> {
    rt.block_on(async {
        let library = open_library(config, db).await?;
        let paths = fetcher(config, &library)
            .get_indexable_paths_for_all_folders()
            .await?;

        for path in &paths {
            let modified = ticks::to_datetime(path.date_modified_ticks)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "?".to_string());
            println!("{:>4}  {}  {}", path.folder_id, modified, path.path.display());
        }
        println!("\n{} indexable files", paths.len());
        Ok(())
    })
}

/// Check whether the collection is outdated
pub fn cmd_check(
    rt: &Runtime,
    config: &Config,
    db: Option<&PathBuf>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let library = open_library(config, db).await?;
        let checker = CollectionChecker::new(library.clone(), fetcher(config, &library));
        let status = checker.check().await?;

        match format {
            OutputFormat::Json => {
                let mut report = serde_json::to_value(status)?;
                report["outdated"] = serde_json::Value::Bool(status.is_outdated());
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => {
                println!("Collection Status");
                println!("=================");
                println!("Tracks:             {}", status.total_track_count);
                println!("Indexable files:    {}", status.live_indexable_path_count);
                println!("Needing indexing:   {}", status.tracks_needing_indexing);
                println!(
                    "Newer files:        {}",
                    if status.has_newer_files() { "yes" } else { "no" }
                );
                println!();
                if status.is_outdated() {
                    println!("Collection is outdated. Run `index` to update it.");
                } else {
                    println!("Collection is up to date.");
                }
            }
        }
        Ok(())
    })
}
