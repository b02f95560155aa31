//! Crate-wide error types.
//!
//! Library modules return [`Error`] through the [`Result`] alias, while the
//! CLI binary uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: one enum covering filesystem, walk and database failures
//! - [`ResultExt`]: attach human-readable context to any fallible call
//! - Errors are `Send + Sync` so they can cross `spawn_blocking` boundaries
//!
//! # Example
//!
//! ```ignore
//! use collection_indexer::error::{Result, ResultExt};
//!
//! async fn forget(library: &SqliteLibrary, path: &str) -> Result<bool> {
//!     library.delete_track_by_path(path).await.with_context(format!("removing {}", path))
//! }
//! ```

use std::path::PathBuf;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error tied to a specific path
    #[error("Cannot access {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error reported while enumerating a directory
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File or directory not found
    #[error("Not found: {0}")]
    NotFound(PathBuf),

    /// A blocking task panicked or was aborted
    #[error("Task join error: {0}")]
    TaskJoin(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an access error for `path`.
    pub fn access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Access {
            path: path.into(),
            source,
        }
    }

    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}
