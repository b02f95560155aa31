//! Builds the list of indexable audio files across all collection folders.
//!
//! # Fetch Flow
//!
//! ```text
//! 1. Load folders from the folder repository
//! 2. Skip folders whose root no longer exists (unmounted drives)
//! 3. Walk each folder on a blocking thread
//! 4. Keep files with a supported extension, stat their mtime
//! 5. Concatenate per-folder results in folder order
//! ```
//!
//! Walk errors, mtime failures and failed folders are logged and dropped so
//! one bad file or folder never costs the rest of the collection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{CancelFlag, DirectoryWalker, SupportedExtensions};
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use crate::model::{Folder, IndexablePath};
use crate::repository::FolderRepository;

/// Fetches indexable paths for every configured folder.
#[derive(Clone)]
pub struct IndexablePathFetcher {
    fs: Arc<dyn FileSystem>,
    folders: Arc<dyn FolderRepository>,
    extensions: SupportedExtensions,
    cancel: CancelFlag,
}

impl IndexablePathFetcher {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        folders: Arc<dyn FolderRepository>,
        extensions: SupportedExtensions,
    ) -> Self {
        Self {
            fs,
            folders,
            extensions,
            cancel: CancelFlag::default(),
        }
    }

    /// Stop between folders (and inside walks) when `cancel` is set.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Indexable paths for all folders, in folder order.
    ///
    /// Only a failure to load the folder list is returned as an error.
    pub async fn get_indexable_paths_for_all_folders(&self) -> Result<Vec<IndexablePath>> {
        let folders = self.folders.get_folders().await?;
        let mut indexable = Vec::new();

        for folder in &folders {
            if self.cancel.is_cancelled() {
                tracing::info!(target: "scanner::fetcher", collected = indexable.len(), "Fetch cancelled");
                break;
            }

            match self.fs.path_exists(&folder.path_buf()) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!(target: "scanner::fetcher", folder = %folder.path, "Folder root missing, skipping");
                    continue;
                }
                Err(e) => {
                    tracing::error!(
                        target: "scanner::fetcher",
                        operation = "get_indexable_paths_for_all_folders",
                        folder = %folder.path,
                        error = %e,
                        "Could not check folder root, skipping"
                    );
                    continue;
                }
            }

            match self.get_indexable_paths_for_folder(folder).await {
                Ok(paths) => indexable.extend(paths),
                Err(e) => {
                    tracing::error!(
                        target: "scanner::fetcher",
                        operation = "get_indexable_paths_for_all_folders",
                        folder = %folder.path,
                        error = %e,
                        "Could not get indexable paths for folder"
                    );
                }
            }
        }

        tracing::info!(
            target: "scanner::fetcher",
            folders = folders.len(),
            paths = indexable.len(),
            "Fetched indexable paths"
        );

        Ok(indexable)
    }

    /// Indexable paths for a single folder.
    ///
    /// The walk runs on a blocking thread; only a failure of that thread
    /// is returned as an error.
    pub async fn get_indexable_paths_for_folder(&self, folder: &Folder) -> Result<Vec<IndexablePath>> {
        let fs = Arc::clone(&self.fs);
        let extensions = self.extensions.clone();
        let cancel = self.cancel.clone();
        let root = folder.path_buf();
        let folder_id = folder.id;

        tokio::task::spawn_blocking(move || {
            collect_indexable_paths(fs, &extensions, cancel, &root, folder_id)
        })
        .await
        .map_err(|e| Error::TaskJoin(e.to_string()))
    }
}

/// Walk `root` and keep the supported audio files.
fn collect_indexable_paths(
    fs: Arc<dyn FileSystem>,
    extensions: &SupportedExtensions,
    cancel: CancelFlag,
    root: &Path,
    folder_id: i64,
) -> Vec<IndexablePath> {
    let walker = DirectoryWalker::new(Arc::clone(&fs)).with_cancel_flag(cancel);
    let walked = walker.get_files_in_directory(root);

    for error in &walked.errors {
        tracing::error!(
            target: "scanner::fetcher",
            operation = "get_indexable_paths_for_folder",
            folder = %root.display(),
            error = %error,
            "Error while walking folder"
        );
    }

    walked
        .file_paths
        .into_iter()
        .filter(|path| extensions.matches(&fs.get_file_extension(path)))
        .filter_map(|path| with_modification_time(fs.as_ref(), path, folder_id))
        .collect()
}

fn with_modification_time(fs: &dyn FileSystem, path: PathBuf, folder_id: i64) -> Option<IndexablePath> {
    match fs.get_modification_time_ticks(&path) {
        Ok(ticks) => Some(IndexablePath::new(path, ticks, folder_id)),
        Err(e) => {
            tracing::error!(
                target: "scanner::fetcher",
                operation = "get_indexable_paths_for_folder",
                path = %path.display(),
                error = %e,
                "Could not read modification time"
            );
            None
        }
    }
}
