//! Local entry model
//!
//! One `LocalEntry` per stored remote id found on disk. The markdown file
//! is optional because media files can outlive their note (e.g. after an
//! interrupted pass), and the entry then only carries media.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// On-disk representation of one exported note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    /// The durable join key back to the remote note.
    pub remote_id: String,
    /// Markdown file path, when one was found.
    pub path: Option<PathBuf>,
    /// Last-synced content fingerprint from the file header.
    pub fingerprint: Option<String>,
    /// Media files keyed by attachment id.
    pub media: BTreeMap<String, PathBuf>,
}

impl LocalEntry {
    /// Create an empty entry for a remote id.
    #[must_use]
    pub fn new(remote_id: impl Into<String>) -> Self {
        Self {
            remote_id: remote_id.into(),
            path: None,
            fingerprint: None,
            media: BTreeMap::new(),
        }
    }

    /// Current markdown filename, when a file exists.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
    }
}

/// Result of scanning the local notes directory once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalIndex {
    /// Entries keyed by stored remote id.
    pub entries: BTreeMap<String, LocalEntry>,
    /// Later files that repeated an already-seen remote id. They are never
    /// match targets; the earliest path wins.
    pub duplicate_note_files: Vec<PathBuf>,
    /// Markdown files without a parseable header.
    pub unknown_markdown: usize,
    /// Total media files seen.
    pub media_files: usize,
    /// Next free ordinal for counter-based naming (max seen prefix + 1).
    pub next_counter: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_of_entry_without_file() {
        let entry = LocalEntry::new("r1");
        assert_eq!(entry.filename(), None);
    }

    #[test]
    fn test_filename_of_entry_with_file() {
        let mut entry = LocalEntry::new("r1");
        entry.path = Some(PathBuf::from("/notes/0001 - Foo.md"));
        assert_eq!(entry.filename(), Some("0001 - Foo.md"));
    }
}
