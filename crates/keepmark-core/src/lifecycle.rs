//! File lifecycle operations on the local tree.
//!
//! All content writes go through [`write_atomic`]: write to a temp file in
//! the same directory, sync, then rename into place. A crash mid-write
//! leaves the previous file intact plus a hidden temp file the scanner
//! ignores; it never leaves a truncated target.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::models::LocalEntry;

/// What an entry deletion removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub notes: usize,
    pub media: usize,
}

/// Write content atomically to a file.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Temp file in the same directory, so the final rename never crosses
    // a filesystem boundary.
    let temp_path = temp_path_for(path);
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)?;
    temp_file.write_all(content)?;
    temp_file.sync_all()?;
    drop(temp_file);

    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Move a note file to a new path.
///
/// Content is untouched, so the embedded header (and with it the stored
/// fingerprint) survives the move.
pub fn rename_note(from: &Path, to: &Path) -> Result<()> {
    debug!(from = %from.display(), to = %to.display(), "renaming note");
    fs::rename(from, to)?;
    Ok(())
}

/// Remove a single file; absent paths are not an error.
pub fn delete_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(error) => Err(error.into()),
    }
}

/// Remove a local entry: its note file and all of its media files.
///
/// Idempotent; re-deleting an already-gone entry removes nothing and
/// succeeds. Empty per-note media directories are swept up as well.
pub fn delete_entry(entry: &LocalEntry) -> Result<DeleteOutcome> {
    let mut outcome = DeleteOutcome::default();

    if let Some(path) = &entry.path {
        if delete_file(path)? {
            outcome.notes += 1;
        }
    }

    let mut media_dirs: Vec<PathBuf> = Vec::new();
    for path in entry.media.values() {
        if delete_file(path)? {
            outcome.media += 1;
        }
        if let Some(parent) = path.parent() {
            if !media_dirs.contains(&parent.to_path_buf()) {
                media_dirs.push(parent.to_path_buf());
            }
        }
    }
    for dir in media_dirs {
        // Only removes empty directories; shared dirs with leftovers stay.
        let _ = fs::remove_dir(dir);
    }

    Ok(outcome)
}

/// Hidden temp path next to the target, unique per process.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_write_atomic_creates_parents_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/0001 - Foo.md");

        write_atomic(&target, b"content").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"content");
        let siblings: Vec<_> = fs::read_dir(target.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(siblings.len(), 1);
    }

    #[test]
    fn test_write_atomic_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a.md");
        fs::write(&target, "old").unwrap();

        write_atomic(&target, b"new").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn test_interrupted_write_leaves_original_intact() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a.md");
        fs::write(&target, "original").unwrap();

        // Simulate a crash between the temp write and the rename.
        let temp = temp_path_for(&target);
        fs::write(&temp, "partial").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "original");

        // The next pass overwrites the stale temp file and completes.
        write_atomic(&target, b"repaired").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "repaired");
    }

    #[test]
    fn test_delete_entry_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let note_path = dir.path().join("0001 - Foo.md");
        let media_dir = dir.path().join("media/r1");
        fs::create_dir_all(&media_dir).unwrap();
        fs::write(&note_path, "note").unwrap();
        fs::write(media_dir.join("a1.png"), "bytes").unwrap();

        let mut entry = LocalEntry::new("r1");
        entry.path = Some(note_path);
        entry
            .media
            .insert("a1".to_string(), media_dir.join("a1.png"));

        let first = delete_entry(&entry).unwrap();
        assert_eq!(first, DeleteOutcome { notes: 1, media: 1 });
        assert!(!media_dir.exists());

        let second = delete_entry(&entry).unwrap();
        assert_eq!(second, DeleteOutcome::default());
    }
}
