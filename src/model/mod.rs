//! Core data models for collection indexing.
//!
//! Defines the persisted entities [`Folder`] and [`Track`], and the
//! transient [`IndexablePath`] produced by each fetch pass.
//!
//! # Database Schema
//!
//! The persisted models map to the following tables:
//! - `folders` - Root folders the user added to the collection
//! - `tracks` - Indexed audio files with their recorded size and mtime

use serde::Serialize;
use sqlx::FromRow;
use std::path::PathBuf;

/// A root folder of the collection.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Folder {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Absolute path of the folder root
    pub path: String,
    /// Whether tracks under this folder are shown in the collection
    pub show_in_collection: bool,
}

impl Folder {
    pub fn path_buf(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}

/// A track (audio file) in the collection.
///
/// Only the fields the indexer reads are modeled here.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Track {
    /// Database ID (auto-generated)
    pub id: i64,
    /// Absolute file path (unique identifier)
    pub path: String,
    /// Owning folder
    pub folder_id: Option<i64>,
    /// File name including extension
    pub file_name: String,
    /// Recorded file size in bytes
    pub file_size: i64,
    /// Recorded modification time, in ticks
    pub date_file_modified: i64,
    /// When the track was first indexed, in ticks
    pub date_added: i64,
    /// 1 when the track was explicitly marked dirty, 0 when clean.
    /// `None` when the stored value is missing or not an integer.
    pub needs_indexing: Option<i64>,
}

impl Track {
    pub fn path_buf(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}

/// An audio file discovered under a configured folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexablePath {
    pub path: PathBuf,
    pub date_modified_ticks: i64,
    pub folder_id: i64,
}

impl IndexablePath {
    pub fn new(path: impl Into<PathBuf>, date_modified_ticks: i64, folder_id: i64) -> Self {
        Self {
            path: path.into(),
            date_modified_ticks,
            folder_id,
        }
    }
}
