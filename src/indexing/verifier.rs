//! Per-track freshness checks.

use std::sync::Arc;

use crate::error::Result;
use crate::fs::FileSystem;
use crate::model::Track;

/// Decides whether a persisted track must be processed again.
#[derive(Clone)]
pub struct TrackVerifier {
    fs: Arc<dyn FileSystem>,
}

impl TrackVerifier {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// True when the file on disk no longer matches what was recorded.
    ///
    /// A recorded size of zero means the track was never fully indexed and
    /// short-circuits without touching the disk. Otherwise size and mtime
    /// are compared for exact equality.
    pub fn is_track_out_of_date(&self, track: &Track) -> Result<bool> {
        if track.file_size == 0 {
            return Ok(true);
        }

        let path = track.path_buf();
        let size = self.fs.get_file_size_bytes(&path)?;
        let modified = self.fs.get_modification_time_ticks(&path)?;

        Ok(i64::try_from(size).map_or(true, |size| size != track.file_size)
            || modified != track.date_file_modified)
    }

    /// True unless the track is explicitly marked clean (`needs_indexing == 0`).
    pub fn does_track_need_indexing(&self, track: &Track) -> bool {
        !matches!(track.needs_indexing, Some(0))
    }

    /// Either check says the track must be processed again.
    pub fn needs_reprocessing(&self, track: &Track) -> Result<bool> {
        if self.does_track_need_indexing(track) {
            return Ok(true);
        }
        self.is_track_out_of_date(track)
    }
}
