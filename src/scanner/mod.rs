//! Discovery of audio files under the configured collection folders.
//!
//! - [`DirectoryWalker`]: recursive file enumeration that records errors
//!   instead of failing
//! - [`IndexablePathFetcher`]: walks every folder, filters by extension and
//!   attaches modification times
//! - [`SupportedExtensions`]: case-insensitive extension set
//! - [`CancelFlag`]: shared flag to stop a walk or fetch early
//!
//! # Usage
//!
//! ```rust,ignore
//! let walker = DirectoryWalker::new(Arc::new(OsFileSystem::default()));
//! let result = walker.get_files_in_directory(Path::new("/music"));
//! for error in &result.errors {
//!     eprintln!("could not scan: {}", error);
//! }
//! ```

mod extensions;
mod fetcher;
mod walker;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub use extensions::{DEFAULT_EXTENSIONS, SupportedExtensions};
pub use fetcher::IndexablePathFetcher;
pub use walker::{DirectoryWalkResult, DirectoryWalker};

/// Cooperative cancellation for walks and fetches.
///
/// Cancelling makes the running operation stop at its next checkpoint and
/// return what it has collected so far.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
