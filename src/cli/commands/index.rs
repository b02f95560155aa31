//! Index command: reconcile the database with the files on disk.

use std::path::PathBuf;
use tokio::runtime::Runtime;

use super::{fetcher, open_library};
use crate::config::Config;
use crate::indexing::{IndexingPlan, IndexingSummary, Reconciler};

/// Number of entries listed per category in a dry run
const PREVIEW_LIMIT: usize = 20;

/// Plan an index pass and apply it unless `dry_run` is set
pub fn cmd_index(
    rt: &Runtime,
    config: &Config,
    db: Option<&PathBuf>,
    dry_run: bool,
) -> anyhow::Result<()> {
    rt.block_on(async {
        let library = open_library(config, db).await?;
        let reconciler = Reconciler::new(library.clone(), fetcher(config, &library));

        let plan = reconciler.plan().await?;

        if plan.is_empty() {
            println!("Collection is up to date ({} tracks).", plan.unchanged);
            return Ok(());
        }

        if dry_run {
            print_plan(&plan);
            print_summary("Would apply", &plan.summary());
            return Ok(());
        }

        let summary = reconciler.apply(&plan, &library).await?;
        print_summary("Applied", &summary);
        Ok(())
    })
}

fn print_plan(plan: &IndexingPlan) {
    print_section("New", plan.added.iter().map(|p| p.path.display().to_string()));
    print_section("Changed", plan.changed.iter().map(|(t, _)| t.path.clone()));
    print_section("Removed", plan.removed.iter().map(|t| t.path.clone()));
}

fn print_section(title: &str, entries: impl ExactSizeIterator<Item = String>) {
    let total = entries.len();
    if total == 0 {
        return;
    }
    println!("{} ({}):", title, total);
    for entry in entries.take(PREVIEW_LIMIT) {
        println!("  {}", entry);
    }
    if total > PREVIEW_LIMIT {
        println!("  ... and {} more", total - PREVIEW_LIMIT);
    }
}

fn print_summary(verb: &str, summary: &IndexingSummary) {
    println!(
        "{}: {} added, {} changed, {} removed, {} unchanged",
        verb, summary.added, summary.changed, summary.removed, summary.unchanged
    );
    if summary.failed > 0 {
        eprintln!("{} files skipped (unreadable or empty)", summary.failed);
    }
}
