//! Trait definitions for the folder and track stores.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses [`SqliteLibrary`], while tests can substitute the
//! mock implementations in [`mocks`].
//!
//! # Example
//!
//! ```ignore
//! use collection_indexer::repository::TrackRepository;
//!
//! async fn report<T: TrackRepository>(repo: &T) -> Result<()> {
//!     println!("{} tracks", repo.get_number_of_tracks().await?);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;

use crate::db::SqliteLibrary;
use crate::error::Result;
use crate::model::{Folder, Track};

/// Source of the configured collection folders.
#[async_trait]
pub trait FolderRepository: Send + Sync {
    async fn get_folders(&self) -> Result<Vec<Folder>>;
}

/// Aggregates and rows from the persisted track table.
#[async_trait]
pub trait TrackRepository: Send + Sync {
    /// Tracks whose `needs_indexing` flag is set.
    async fn get_number_of_tracks_that_need_indexing(&self) -> Result<i64>;

    async fn get_number_of_tracks(&self) -> Result<i64>;

    /// Largest stored modification time, or 0 when there are no tracks.
    async fn get_maximum_date_file_modified(&self) -> Result<i64>;

    async fn get_tracks(&self) -> Result<Vec<Track>>;
}

// Implement traits for the SQLite store

#[async_trait]
impl FolderRepository for SqliteLibrary {
    async fn get_folders(&self) -> Result<Vec<Folder>> {
        Ok(self.folders().await?)
    }
}

#[async_trait]
impl TrackRepository for SqliteLibrary {
    async fn get_number_of_tracks_that_need_indexing(&self) -> Result<i64> {
        Ok(self.count_tracks_needing_indexing().await?)
    }

    async fn get_number_of_tracks(&self) -> Result<i64> {
        Ok(self.count_tracks().await?)
    }

    async fn get_maximum_date_file_modified(&self) -> Result<i64> {
        Ok(self.max_date_file_modified().await?.unwrap_or(0))
    }

    async fn get_tracks(&self) -> Result<Vec<Track>> {
        Ok(self.tracks().await?)
    }
}

/// Mock repositories for testing.
///
/// Return configurable values for testing different scenarios.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::error::Error;

    /// Mock folder store returning a fixed list.
    #[derive(Default)]
    pub struct MockFolderRepository {
        pub folders: Vec<Folder>,
        /// Fail every call (takes precedence over folders)
        pub fail: bool,
    }

    impl MockFolderRepository {
        /// Folders built from `(id, path)` pairs.
        pub fn with_folders(folders: &[(i64, &str)]) -> Self {
            Self {
                folders: folders
                    .iter()
                    .map(|(id, path)| Folder {
                        id: *id,
                        path: path.to_string(),
                        show_in_collection: true,
                    })
                    .collect(),
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                folders: vec![],
                fail: true,
            }
        }
    }

    #[async_trait]
    impl FolderRepository for MockFolderRepository {
        async fn get_folders(&self) -> Result<Vec<Folder>> {
            if self.fail {
                return Err(Error::Database(sqlx::Error::PoolTimedOut));
            }
            Ok(self.folders.clone())
        }
    }

    /// Mock track store with fixed aggregates.
    #[derive(Default)]
    pub struct MockTrackRepository {
        pub needing_indexing: i64,
        pub total: i64,
        pub max_date_file_modified: i64,
        pub tracks: Vec<Track>,
    }

    impl MockTrackRepository {
        pub fn with_counts(needing_indexing: i64, total: i64, max_date_file_modified: i64) -> Self {
            Self {
                needing_indexing,
                total,
                max_date_file_modified,
                tracks: vec![],
            }
        }

        /// Aggregates derived from `tracks`.
        pub fn with_tracks(tracks: Vec<Track>) -> Self {
            Self {
                needing_indexing: tracks
                    .iter()
                    .filter(|t| t.needs_indexing == Some(1))
                    .count() as i64,
                total: tracks.len() as i64,
                max_date_file_modified: tracks
                    .iter()
                    .map(|t| t.date_file_modified)
                    .max()
                    .unwrap_or(0),
                tracks,
            }
        }
    }

    #[async_trait]
    impl TrackRepository for MockTrackRepository {
        async fn get_number_of_tracks_that_need_indexing(&self) -> Result<i64> {
            Ok(self.needing_indexing)
        }

        async fn get_number_of_tracks(&self) -> Result<i64> {
            Ok(self.total)
        }

        async fn get_maximum_date_file_modified(&self) -> Result<i64> {
            Ok(self.max_date_file_modified)
        }

        async fn get_tracks(&self) -> Result<Vec<Track>> {
            Ok(self.tracks.clone())
        }
    }
}
