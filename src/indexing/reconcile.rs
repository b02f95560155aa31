//! Reconciles the live file set with the persisted tracks.
//!
//! # Reconcile Flow
//!
//! ```text
//! 1. Load persisted tracks and fetch live indexable paths
//! 2. Pair them by path
//! 3. Unpaired live paths are added, unpaired tracks are removed
//! 4. Paired tracks are verified in parallel: changed or unchanged
//! 5. apply() writes the plan to the database
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use super::TrackVerifier;
use crate::db::{NewTrack, SqliteLibrary};
use crate::error::{Error, Result, ResultExt};
use crate::model::{IndexablePath, Track};
use crate::repository::TrackRepository;
use crate::scanner::IndexablePathFetcher;

/// What an index pass would do.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexingPlan {
    /// Files on disk with no track, in fetch order
    pub added: Vec<IndexablePath>,
    /// Tracks whose file changed or that were marked dirty
    pub changed: Vec<(Track, IndexablePath)>,
    /// Tracks whose file is gone, ordered by path
    pub removed: Vec<Track>,
    pub unchanged: usize,
}

impl IndexingPlan {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }

    pub fn summary(&self) -> IndexingSummary {
        IndexingSummary {
            added: self.added.len(),
            changed: self.changed.len(),
            removed: self.removed.len(),
            unchanged: self.unchanged,
            failed: 0,
        }
    }
}

/// Counts reported after planning or applying.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexingSummary {
    pub added: usize,
    pub changed: usize,
    pub removed: usize,
    pub unchanged: usize,
    /// Files that could not be read while applying
    pub failed: usize,
}

/// Plans and applies index passes.
#[derive(Clone)]
pub struct Reconciler {
    tracks: Arc<dyn TrackRepository>,
    fetcher: IndexablePathFetcher,
    verifier: TrackVerifier,
}

impl Reconciler {
    pub fn new(tracks: Arc<dyn TrackRepository>, fetcher: IndexablePathFetcher) -> Self {
        let verifier = TrackVerifier::new(Arc::clone(fetcher.file_system()));
        Self {
            tracks,
            fetcher,
            verifier,
        }
    }

    /// Diff persisted tracks against the live file set.
    pub async fn plan(&self) -> Result<IndexingPlan> {
        let tracks = self.tracks.get_tracks().await?;
        let live = self.fetcher.get_indexable_paths_for_all_folders().await?;
        let verifier = self.verifier.clone();

        let plan = tokio::task::spawn_blocking(move || build_plan(&verifier, tracks, live))
            .await
            .map_err(|e| Error::TaskJoin(e.to_string()))?;

        tracing::info!(
            target: "indexing::reconcile",
            added = plan.added.len(),
            changed = plan.changed.len(),
            removed = plan.removed.len(),
            unchanged = plan.unchanged,
            "Indexing plan ready"
        );

        Ok(plan)
    }

    /// Write `plan` to `library`.
    ///
    /// Files that vanished, became unreadable or are empty are counted as
    /// failed and skipped. Database errors abort the pass.
    pub async fn apply(&self, plan: &IndexingPlan, library: &SqliteLibrary) -> Result<IndexingSummary> {
        let mut summary = IndexingSummary {
            unchanged: plan.unchanged,
            ..Default::default()
        };

        for path in &plan.added {
            let Some(size) = self.current_size(path) else {
                summary.failed += 1;
                continue;
            };
            library
                .upsert_track(&NewTrack {
                    path: path.path.to_string_lossy().into_owned(),
                    folder_id: Some(path.folder_id),
                    file_size: size,
                    date_file_modified: path.date_modified_ticks,
                    needs_indexing: false,
                })
                .await
                .with_context(format!("adding track {}", path.path.display()))?;
            summary.added += 1;
        }

        for (track, path) in &plan.changed {
            let Some(size) = self.current_size(path) else {
                summary.failed += 1;
                continue;
            };
            let modified = self.current_modification_time(path);
            library
                .update_track_file_info(track.id, size, modified)
                .await
                .with_context(format!("updating track {}", track.path))?;
            summary.changed += 1;
        }

        for track in &plan.removed {
            if library
                .delete_track_by_path(&track.path)
                .await
                .with_context(format!("removing track {}", track.path))?
            {
                summary.removed += 1;
            }
        }

        tracing::info!(
            target: "indexing::reconcile",
            added = summary.added,
            changed = summary.changed,
            removed = summary.removed,
            failed = summary.failed,
            "Indexing plan applied"
        );

        Ok(summary)
    }

    /// Size to record for `path`, or `None` when it can't be read or is empty.
    ///
    /// An empty file would be recorded with size 0, which always verifies as
    /// out of date.
    fn current_size(&self, path: &IndexablePath) -> Option<i64> {
        match self.fetcher.file_system().get_file_size_bytes(&path.path) {
            Ok(0) => {
                tracing::warn!(
                    target: "indexing::reconcile",
                    operation = "apply",
                    path = %path.path.display(),
                    "Skipping empty file"
                );
                None
            }
            Ok(size) => Some(i64::try_from(size).unwrap_or(i64::MAX)),
            Err(e) => {
                tracing::error!(
                    target: "indexing::reconcile",
                    operation = "apply",
                    path = %path.path.display(),
                    error = %e,
                    "Could not read file size"
                );
                None
            }
        }
    }

    /// Current mtime, falling back to the one seen while planning.
    fn current_modification_time(&self, path: &IndexablePath) -> i64 {
        match self.fetcher.file_system().get_modification_time_ticks(&path.path) {
            Ok(ticks) => ticks,
            Err(e) => {
                tracing::error!(
                    target: "indexing::reconcile",
                    operation = "apply",
                    path = %path.path.display(),
                    error = %e,
                    "Could not read modification time, using planned value"
                );
                path.date_modified_ticks
            }
        }
    }
}

fn build_plan(verifier: &TrackVerifier, tracks: Vec<Track>, live: Vec<IndexablePath>) -> IndexingPlan {
    let mut by_path: HashMap<String, Track> = tracks
        .into_iter()
        .map(|track| (track.path.clone(), track))
        .collect();

    let mut plan = IndexingPlan::default();
    let mut paired = Vec::new();
    let mut seen = HashSet::new();

    for path in live {
        let key = path.path.to_string_lossy().into_owned();
        // Overlapping folders yield the same file twice; the first folder wins
        if !seen.insert(key.clone()) {
            tracing::debug!(
                target: "indexing::reconcile",
                path = %key,
                folder_id = path.folder_id,
                "File already found under an earlier folder"
            );
            continue;
        }
        match by_path.remove(&key) {
            Some(track) => paired.push((track, path)),
            None => plan.added.push(path),
        }
    }

    plan.removed = by_path.into_values().collect();
    plan.removed.sort_by(|a, b| a.path.cmp(&b.path));

    let verdicts: Vec<bool> = paired
        .par_iter()
        .map(|(track, _)| match verifier.needs_reprocessing(track) {
            Ok(stale) => stale,
            Err(e) => {
                tracing::warn!(
                    target: "indexing::reconcile",
                    path = %track.path,
                    error = %e,
                    "Could not verify track, treating as changed"
                );
                true
            }
        })
        .collect();

    for (pair, stale) in paired.into_iter().zip(verdicts) {
        if stale {
            plan.changed.push(pair);
        } else {
            plan.unchanged += 1;
        }
    }

    plan
}
