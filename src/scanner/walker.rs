//! Recursive directory enumeration with per-directory error isolation.
//!
//! The walk is driven by an explicit stack of pending directories and one
//! pair of accumulators, so a failing directory can only ever add to
//! `errors`. It never removes work queued for its siblings.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::CancelFlag;
use crate::error::Error;
use crate::fs::FileSystem;

/// Everything found by one walk.
#[derive(Debug, Default)]
pub struct DirectoryWalkResult {
    /// Regular files, in traversal order. Never contains directories.
    pub file_paths: Vec<PathBuf>,
    /// Every failure met during the walk, in the order encountered.
    pub errors: Vec<Error>,
}

/// Recursively lists files under a root directory.
#[derive(Clone)]
pub struct DirectoryWalker {
    fs: Arc<dyn FileSystem>,
    cancel: CancelFlag,
}

impl DirectoryWalker {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            cancel: CancelFlag::default(),
        }
    }

    /// Stop the walk early when `cancel` is set.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Collect every regular file under `root`.
    ///
    /// Filesystem failures never escape: they end up in
    /// [`DirectoryWalkResult::errors`] and the walk moves on. Traversal is
    /// pre-order with files before subdirectories at each level. Each
    /// physical directory is entered at most once, which also stops symlink
    /// cycles. On cancellation the partial result is returned.
    pub fn get_files_in_directory(&self, root: &Path) -> DirectoryWalkResult {
        let mut result = DirectoryWalkResult::default();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            if self.cancel.is_cancelled() {
                tracing::info!(target: "scanner::walker", root = %root.display(), "Walk cancelled");
                break;
            }

            if let Some(canonical) = self.fs.canonical_path(&dir)
                && !visited.insert(canonical)
            {
                tracing::debug!(target: "scanner::walker", dir = %dir.display(), "Directory already visited, skipping");
                continue;
            }

            self.visit(&dir, &mut result, &mut pending);
        }

        tracing::debug!(
            target: "scanner::walker",
            root = %root.display(),
            files = result.file_paths.len(),
            errors = result.errors.len(),
            "Walk finished"
        );

        result
    }

    fn visit(&self, dir: &Path, result: &mut DirectoryWalkResult, pending: &mut Vec<PathBuf>) {
        match self
            .fs
            .list_files_in_directory(dir, true, &mut result.errors)
        {
            Ok(files) => result.file_paths.extend(files),
            Err(e) => result
                .errors
                .push(e.context(format!("listing files in {}", dir.display()))),
        }

        match self
            .fs
            .list_directories_in_directory(dir, true, &mut result.errors)
        {
            // Reversed so the first subdirectory is popped first
            Ok(subdirs) => pending.extend(subdirs.into_iter().rev()),
            Err(e) => result
                .errors
                .push(e.context(format!("listing directories in {}", dir.display()))),
        }
    }
}
