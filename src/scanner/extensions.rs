//! Supported audio extensions.

use std::collections::BTreeSet;

/// Extensions indexed when the config does not list any.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".mp3", ".flac", ".ogg", ".m4a", ".opus", ".wav", ".wma", ".ape", ".aac",
];

/// Case-insensitive set of file extensions, stored as lowercase `.ext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedExtensions {
    extensions: BTreeSet<String>,
}

impl Default for SupportedExtensions {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS.iter().copied())
    }
}

impl SupportedExtensions {
    /// Build from user-supplied entries. `mp3`, `.MP3` and ` .mp3 ` all
    /// normalize to `.mp3`; blank entries are dropped.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .filter_map(|e| normalize(e.as_ref()))
            .collect();
        Self { extensions }
    }

    /// Whether `extension` (with or without the dot) is supported.
    pub fn matches(&self, extension: &str) -> bool {
        normalize(extension).is_some_and(|e| self.extensions.contains(&e))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

fn normalize(extension: &str) -> Option<String> {
    let trimmed = extension.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!(".{}", trimmed.to_lowercase()))
}
