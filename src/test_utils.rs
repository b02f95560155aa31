//! Test utilities and fixtures for collection-indexer tests.
//!
//! This module provides an in-memory [`FileSystem`] double, database
//! helpers and track factories to reduce boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use collection_indexer::test_utils::{MemoryFileSystem, temp_db};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (library, _dir) = temp_db().await;
//!     let fs = MemoryFileSystem::new().with_file("/Music/a.mp3", 10, 100);
//!     // ... test logic
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;

use crate::db::SqliteLibrary;
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::model::Track;

/// Creates a temporary database for testing.
///
/// Keep the returned `TempDir` alive for the duration of the test; the
/// database file is deleted when it is dropped.
pub async fn temp_db() -> (SqliteLibrary, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db");
    let db_url = crate::db::db_url(Some(&db_path));

    let pool = crate::db::init_db(&db_url)
        .await
        .expect("Failed to initialize test database");

    (SqliteLibrary::new(pool), dir)
}

/// Creates a mock Track with sensible defaults.
///
/// Customize using struct update syntax:
///
/// ```ignore
/// let track = Track { file_size: 0, ..mock_track("/Music/a.mp3") };
/// ```
pub fn mock_track(path: &str) -> Track {
    Track {
        id: 1,
        path: path.to_string(),
        folder_id: Some(1),
        file_name: Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        file_size: 10,
        date_file_modified: 100,
        date_added: 50,
        needs_indexing: Some(0),
    }
}

#[derive(Debug, Clone, Copy)]
struct MemoryFile {
    size: u64,
    ticks: i64,
}

/// In-memory [`FileSystem`] with injectable failures.
///
/// Paths are used verbatim; adding a file creates all of its ancestor
/// directories. Directory aliases behave like symlinks to directories.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: BTreeMap<PathBuf, MemoryFile>,
    dirs: BTreeSet<PathBuf>,
    aliases: HashMap<PathBuf, PathBuf>,
    failing_file_listings: HashSet<PathBuf>,
    failing_dir_listings: HashSet<PathBuf>,
    failing_stats: HashSet<PathBuf>,
    failing_mtimes: HashSet<PathBuf>,
    unreadable_entries: BTreeSet<PathBuf>,
    calls: AtomicUsize,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, size: u64, ticks: i64) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.files.insert(path, MemoryFile { size, ticks });
        self
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.dirs.insert(path);
        self
    }

    /// Make `link` a directory that resolves to `target`.
    pub fn with_dir_alias(mut self, link: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        let link = link.into();
        self.add_ancestors(&link);
        self.aliases.insert(link, target.into());
        self
    }

    pub fn with_failing_file_listing(mut self, dir: impl Into<PathBuf>) -> Self {
        self.failing_file_listings.insert(dir.into());
        self
    }

    pub fn with_failing_dir_listing(mut self, dir: impl Into<PathBuf>) -> Self {
        self.failing_dir_listings.insert(dir.into());
        self
    }

    /// Size and mtime lookups for `path` fail.
    pub fn with_failing_stat(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing_stats.insert(path.into());
        self
    }

    /// Only mtime lookups for `path` fail.
    pub fn with_failing_mtime(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing_mtimes.insert(path.into());
        self
    }

    /// An entry that shows up in its parent's listing but cannot be read.
    pub fn with_unreadable_entry(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.unreadable_entries.insert(path);
        self
    }

    /// All file paths, in sorted order.
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }

    /// Number of calls made through the [`FileSystem`] trait.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn add_ancestors(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Follow aliases until the path names a real entry.
    fn resolve(&self, path: &Path) -> PathBuf {
        let mut current = path.to_path_buf();
        // Bounded so a self-referencing alias cannot spin forever
        for _ in 0..64 {
            let Some((link, target)) = self
                .aliases
                .iter()
                .find(|(link, _)| current.starts_with(link))
            else {
                break;
            };
            let rest = current
                .strip_prefix(link)
                .map(Path::to_path_buf)
                .unwrap_or_default();
            current = target.join(rest);
        }
        current
    }

    fn ensure_dir(&self, dir: &Path, resolved: &Path) -> Result<()> {
        if self.dirs.contains(resolved) {
            Ok(())
        } else {
            Err(Error::not_found(dir))
        }
    }

    fn collect_entry_errors(
        &self,
        dir: &Path,
        resolved: &Path,
        continue_on_error: bool,
        errors: &mut Vec<Error>,
    ) -> Result<()> {
        for entry in self
            .unreadable_entries
            .iter()
            .filter(|p| p.parent() == Some(resolved))
        {
            let name = entry.file_name().unwrap_or_default();
            let err = Error::access(
                dir.join(name),
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            );
            if continue_on_error {
                errors.push(err);
            } else {
                return Err(err);
            }
        }
        Ok(())
    }

    fn children<'a>(
        dir: &'a Path,
        resolved: &'a Path,
        paths: impl Iterator<Item = &'a PathBuf> + 'a,
    ) -> impl Iterator<Item = PathBuf> + 'a {
        paths
            .filter(move |p| p.parent() == Some(resolved))
            .filter_map(move |p| p.file_name().map(|name| dir.join(name)))
    }
}

impl FileSystem for MemoryFileSystem {
    fn list_files_in_directory(
        &self,
        dir: &Path,
        continue_on_error: bool,
        errors: &mut Vec<Error>,
    ) -> Result<Vec<PathBuf>> {
        self.record_call();
        let resolved = self.resolve(dir);
        self.ensure_dir(dir, &resolved)?;
        if self.failing_file_listings.contains(dir) {
            return Err(Error::access(
                dir,
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ));
        }
        self.collect_entry_errors(dir, &resolved, continue_on_error, errors)?;
        Ok(Self::children(dir, &resolved, self.files.keys()).collect())
    }

    fn list_directories_in_directory(
        &self,
        dir: &Path,
        _continue_on_error: bool,
        _errors: &mut Vec<Error>,
    ) -> Result<Vec<PathBuf>> {
        self.record_call();
        let resolved = self.resolve(dir);
        self.ensure_dir(dir, &resolved)?;
        if self.failing_dir_listings.contains(dir) {
            return Err(Error::access(
                dir,
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ));
        }
        let mut subdirs: Vec<PathBuf> = Self::children(dir, &resolved, self.dirs.iter()).collect();
        subdirs.extend(Self::children(dir, &resolved, self.aliases.keys()));
        Ok(subdirs)
    }

    fn get_modification_time_ticks(&self, path: &Path) -> Result<i64> {
        self.record_call();
        if self.failing_stats.contains(path) || self.failing_mtimes.contains(path) {
            return Err(Error::access(path, std::io::Error::other("stat failed")));
        }
        self.files
            .get(&self.resolve(path))
            .map(|f| f.ticks)
            .ok_or_else(|| Error::not_found(path))
    }

    fn get_file_size_bytes(&self, path: &Path) -> Result<u64> {
        self.record_call();
        if self.failing_stats.contains(path) {
            return Err(Error::access(path, std::io::Error::other("stat failed")));
        }
        self.files
            .get(&self.resolve(path))
            .map(|f| f.size)
            .ok_or_else(|| Error::not_found(path))
    }

    fn path_exists(&self, path: &Path) -> Result<bool> {
        self.record_call();
        if self.failing_stats.contains(path) {
            return Err(Error::access(
                path,
                std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            ));
        }
        let resolved = self.resolve(path);
        Ok(self.files.contains_key(&resolved) || self.dirs.contains(&resolved))
    }

    fn canonical_path(&self, path: &Path) -> Option<PathBuf> {
        Some(self.resolve(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_temp_db_creates_working_database() {
        use crate::repository::TrackRepository;

        let (library, _dir) = temp_db().await;
        assert_eq!(library.get_number_of_tracks().await.unwrap(), 0);
    }

    #[test]
    fn test_mock_track_defaults() {
        let track = mock_track("/Music/song.mp3");
        assert_eq!(track.file_name, "song.mp3");
        assert_eq!(track.file_size, 10);
        assert_eq!(track.needs_indexing, Some(0));
    }

    #[test]
    fn test_memory_fs_lists_children_only() {
        let fs = MemoryFileSystem::new()
            .with_file("/Music/a.mp3", 1, 1)
            .with_file("/Music/Sub/b.mp3", 1, 1);
        let mut errors = Vec::new();

        let files = fs
            .list_files_in_directory(Path::new("/Music"), true, &mut errors)
            .unwrap();
        let dirs = fs
            .list_directories_in_directory(Path::new("/Music"), true, &mut errors)
            .unwrap();

        assert_eq!(files, vec![PathBuf::from("/Music/a.mp3")]);
        assert_eq!(dirs, vec![PathBuf::from("/Music/Sub")]);
        assert_eq!(fs.calls(), 2);
    }

    #[test]
    fn test_memory_fs_alias_resolves() {
        let fs = MemoryFileSystem::new()
            .with_file("/Music/a/song.mp3", 3, 7)
            .with_dir_alias("/Link", "/Music/a");

        assert_eq!(fs.get_file_size_bytes(Path::new("/Link/song.mp3")).unwrap(), 3);
        assert_eq!(
            fs.canonical_path(Path::new("/Link")),
            Some(PathBuf::from("/Music/a"))
        );
    }
}
