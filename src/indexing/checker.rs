//! Cheap staleness check for the whole collection.
//!
//! Compares three database aggregates against one live fetch instead of
//! diffing every track. A replaced file with identical count and mtime
//! pattern slips through; a full index pass catches it.

use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::repository::TrackRepository;
use crate::scanner::IndexablePathFetcher;

/// Inputs and outcome of one staleness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectionStatus {
    pub tracks_needing_indexing: i64,
    pub total_track_count: i64,
    pub max_date_file_modified: i64,
    pub live_indexable_path_count: i64,
    pub live_max_date_modified: i64,
}

impl CollectionStatus {
    pub fn has_tracks_needing_indexing(&self) -> bool {
        self.tracks_needing_indexing > 0
    }

    /// Counts differ in either direction.
    pub fn has_count_mismatch(&self) -> bool {
        self.total_track_count != self.live_indexable_path_count
    }

    pub fn has_newer_files(&self) -> bool {
        self.live_max_date_modified > self.max_date_file_modified
    }

    pub fn is_outdated(&self) -> bool {
        self.has_tracks_needing_indexing() || self.has_count_mismatch() || self.has_newer_files()
    }
}

/// Decides whether the collection needs a new index pass.
#[derive(Clone)]
pub struct CollectionChecker {
    tracks: Arc<dyn TrackRepository>,
    fetcher: IndexablePathFetcher,
}

impl CollectionChecker {
    pub fn new(tracks: Arc<dyn TrackRepository>, fetcher: IndexablePathFetcher) -> Self {
        Self { tracks, fetcher }
    }

    pub async fn is_collection_outdated(&self) -> Result<bool> {
        Ok(self.check().await?.is_outdated())
    }

    /// Gather the aggregates and live counts behind the decision.
    pub async fn check(&self) -> Result<CollectionStatus> {
        let tracks_needing_indexing = self.tracks.get_number_of_tracks_that_need_indexing().await?;
        let total_track_count = self.tracks.get_number_of_tracks().await?;
        let max_date_file_modified = self.tracks.get_maximum_date_file_modified().await?;

        let live = self.fetcher.get_indexable_paths_for_all_folders().await?;
        let live_max_date_modified = live
            .iter()
            .map(|p| p.date_modified_ticks)
            .max()
            .unwrap_or(0);

        let status = CollectionStatus {
            tracks_needing_indexing,
            total_track_count,
            max_date_file_modified,
            live_indexable_path_count: live.len() as i64,
            live_max_date_modified,
        };

        tracing::info!(
            target: "indexing::checker",
            needing_indexing = status.tracks_needing_indexing,
            tracks = status.total_track_count,
            live_paths = status.live_indexable_path_count,
            newer_files = status.has_newer_files(),
            outdated = status.is_outdated(),
            "Collection check finished"
        );

        Ok(status)
    }
}
