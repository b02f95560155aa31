//! Filesystem access for the indexer.
//!
//! All disk access made by the walker, fetcher and verifier goes through the
//! [`FileSystem`] trait so tests can substitute an in-memory double.
//! [`OsFileSystem`] is the real implementation.
//!
//! Listing calls take a `continue_on_error` flag and an error sink. With the
//! flag set, a failure on a single entry (a file deleted mid-scan, a broken
//! symlink, a permission-denied child) is pushed onto the sink and the
//! listing carries on. Failure to open the directory itself is always
//! returned as `Err`.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::ticks;

/// Capability set the indexer needs from the filesystem.
pub trait FileSystem: Send + Sync {
    /// Regular files directly inside `dir`.
    fn list_files_in_directory(
        &self,
        dir: &Path,
        continue_on_error: bool,
        errors: &mut Vec<Error>,
    ) -> Result<Vec<PathBuf>>;

    /// Subdirectories directly inside `dir`.
    fn list_directories_in_directory(
        &self,
        dir: &Path,
        continue_on_error: bool,
        errors: &mut Vec<Error>,
    ) -> Result<Vec<PathBuf>>;

    /// Extension including the leading dot (e.g. `.mp3`), or empty.
    fn get_file_extension(&self, path: &Path) -> String {
        path.extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default()
    }

    /// Last modification time in ticks.
    fn get_modification_time_ticks(&self, path: &Path) -> Result<i64>;

    /// File size in bytes.
    fn get_file_size_bytes(&self, path: &Path) -> Result<u64>;

    /// Whether `path` exists. An error means existence could not be
    /// determined (e.g. permission denied on a parent).
    fn path_exists(&self, path: &Path) -> Result<bool>;

    /// Canonical identity of a directory, used for cycle detection.
    /// Returning `None` disables detection for that path.
    fn canonical_path(&self, path: &Path) -> Option<PathBuf> {
        Some(path.to_path_buf())
    }
}

/// Which kind of entry a listing collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Directory,
}

/// [`FileSystem`] backed by the operating system.
#[derive(Debug, Clone)]
pub struct OsFileSystem {
    follow_symlinks: bool,
}

impl Default for OsFileSystem {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
        }
    }
}

impl OsFileSystem {
    pub fn new(follow_symlinks: bool) -> Self {
        Self { follow_symlinks }
    }

    fn list_entries(
        &self,
        dir: &Path,
        kind: EntryKind,
        continue_on_error: bool,
        errors: &mut Vec<Error>,
    ) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.follow_symlinks);

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    let wanted = match kind {
                        EntryKind::File => file_type.is_file(),
                        EntryKind::Directory => file_type.is_dir(),
                    };
                    if wanted {
                        found.push(entry.into_path());
                    }
                }
                // Depth 0 is the directory itself: the listing failed as a whole
                Err(e) if e.depth() == 0 => return Err(Error::Walk(e)),
                Err(e) if continue_on_error => {
                    tracing::debug!(target: "fs", dir = %dir.display(), error = %e, "Skipping unreadable entry");
                    errors.push(Error::Walk(e));
                }
                Err(e) => return Err(Error::Walk(e)),
            }
        }

        Ok(found)
    }
}

impl FileSystem for OsFileSystem {
    fn list_files_in_directory(
        &self,
        dir: &Path,
        continue_on_error: bool,
        errors: &mut Vec<Error>,
    ) -> Result<Vec<PathBuf>> {
        self.list_entries(dir, EntryKind::File, continue_on_error, errors)
    }

    fn list_directories_in_directory(
        &self,
        dir: &Path,
        continue_on_error: bool,
        errors: &mut Vec<Error>,
    ) -> Result<Vec<PathBuf>> {
        self.list_entries(dir, EntryKind::Directory, continue_on_error, errors)
    }

    fn get_modification_time_ticks(&self, path: &Path) -> Result<i64> {
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| Error::access(path, e))?;
        Ok(ticks::from_system_time(modified))
    }

    fn get_file_size_bytes(&self, path: &Path) -> Result<u64> {
        std::fs::metadata(path)
            .map(|m| m.len())
            .map_err(|e| Error::access(path, e))
    }

    fn path_exists(&self, path: &Path) -> Result<bool> {
        path.try_exists().map_err(|e| Error::access(path, e))
    }

    fn canonical_path(&self, path: &Path) -> Option<PathBuf> {
        std::fs::canonicalize(path).ok()
    }
}
