//! Local directory scan: builds the index of already-exported notes.
//!
//! Every pass re-reads the headers instead of trusting a side database;
//! the exported files are the source of truth (see the embedded header
//! tradeoff in DESIGN.md).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;
use crate::markdown;
use crate::models::{LocalEntry, LocalIndex};
use crate::naming;

/// Name of the media subdirectory inside the notes directory.
pub const MEDIA_DIR: &str = "media";

/// Scan the notes directory once and index it by stored remote id.
///
/// Markdown files directly in the tree are note candidates; files under
/// `media/<remote_id>/` are media keyed by their stem (the attachment id).
/// Files are visited in sorted path order, so when two files claim the
/// same remote id the earliest path deterministically wins and the later
/// one is recorded as a duplicate.
pub fn index_local_files(notes_dir: &Path) -> Result<LocalIndex> {
    let mut files = Vec::new();
    collect_files(notes_dir, &mut files)?;
    files.sort();

    let media_root = notes_dir.join(MEDIA_DIR);
    let mut index = LocalIndex {
        next_counter: 1,
        ..LocalIndex::default()
    };

    for file in files {
        if file.starts_with(&media_root) {
            index_media_file(&media_root, &file, &mut index);
        } else if file.extension().is_some_and(|ext| ext == "md") {
            index_note_file(&file, &mut index);
        }
    }

    Ok(index)
}

fn index_note_file(file: &Path, index: &mut LocalIndex) {
    let Some(filename) = file.file_name().and_then(|name| name.to_str()) else {
        return;
    };

    if let Some(ordinal) = naming::parse_counter_prefix(filename) {
        index.next_counter = index.next_counter.max(ordinal.saturating_add(1));
    }

    let content = match fs::read_to_string(file) {
        Ok(content) => content,
        Err(error) => {
            warn!(path = %file.display(), %error, "unable to read markdown file, skipping");
            index.unknown_markdown += 1;
            return;
        }
    };

    let Some(header) = markdown::parse_header(&content) else {
        index.unknown_markdown += 1;
        return;
    };

    let entry = index
        .entries
        .entry(header.remote_id.clone())
        .or_insert_with(|| LocalEntry::new(header.remote_id.clone()));

    if entry.path.is_some() {
        warn!(
            remote_id = %header.remote_id,
            path = %file.display(),
            "duplicate stored remote id, keeping earliest file"
        );
        index.duplicate_note_files.push(file.to_path_buf());
    } else {
        entry.path = Some(file.to_path_buf());
        entry.fingerprint = Some(header.fingerprint);
    }
}

fn index_media_file(media_root: &Path, file: &Path, index: &mut LocalIndex) {
    // media/<remote_id>/<attachment_id>.<ext>
    let Ok(relative) = file.strip_prefix(media_root) else {
        return;
    };
    let mut components = relative.components();
    let (Some(remote_id), Some(_filename), None) =
        (components.next(), components.next(), components.next())
    else {
        return;
    };
    let Some(remote_id) = remote_id.as_os_str().to_str() else {
        return;
    };
    let Some(attachment_id) = file.file_stem().and_then(|stem| stem.to_str()) else {
        return;
    };

    index.media_files += 1;
    index
        .entries
        .entry(remote_id.to_string())
        .or_insert_with(|| LocalEntry::new(remote_id))
        .media
        .insert(attachment_id.to_string(), file.to_path_buf());
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for child in fs::read_dir(dir)? {
        let child = child?;
        let path = child.path();
        let hidden = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with('.'));
        if hidden {
            // Leftover temp files from an interrupted pass live here.
            continue;
        }
        if child.file_type()?.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_note(dir: &Path, name: &str, remote_id: &str, fingerprint: &str) {
        let content = format!("---\nremote_id: {remote_id}\nfingerprint: {fingerprint}\n---\n\n# x\n");
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_index_reads_headers() {
        let dir = tempfile::tempdir().unwrap();
        write_note(dir.path(), "0001 - Foo.md", "r1", "sha256:aa");

        let index = index_local_files(dir.path()).unwrap();
        let entry = &index.entries["r1"];
        assert_eq!(entry.path, Some(dir.path().join("0001 - Foo.md")));
        assert_eq!(entry.fingerprint, Some("sha256:aa".to_string()));
        assert_eq!(index.next_counter, 2);
    }

    #[test]
    fn test_missing_directory_yields_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let index = index_local_files(&dir.path().join("absent")).unwrap();
        assert!(index.entries.is_empty());
        assert_eq!(index.next_counter, 1);
    }

    #[test]
    fn test_duplicate_remote_id_keeps_earliest_path() {
        let dir = tempfile::tempdir().unwrap();
        write_note(dir.path(), "0001 - A.md", "r1", "sha256:aa");
        write_note(dir.path(), "0002 - B.md", "r1", "sha256:bb");

        let index = index_local_files(dir.path()).unwrap();
        assert_eq!(
            index.entries["r1"].path,
            Some(dir.path().join("0001 - A.md"))
        );
        assert_eq!(
            index.duplicate_note_files,
            vec![dir.path().join("0002 - B.md")]
        );
    }

    #[test]
    fn test_headerless_markdown_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "# hello\n").unwrap();

        let index = index_local_files(dir.path()).unwrap();
        assert!(index.entries.is_empty());
        assert_eq!(index.unknown_markdown, 1);
    }

    #[test]
    fn test_media_files_key_by_attachment_id() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("media/r1");
        fs::create_dir_all(&media).unwrap();
        fs::write(media.join("a1.png"), b"bytes").unwrap();

        let index = index_local_files(dir.path()).unwrap();
        assert_eq!(index.media_files, 1);
        assert_eq!(index.entries["r1"].media["a1"], media.join("a1.png"));
        assert_eq!(index.entries["r1"].path, None);
    }

    #[test]
    fn test_hidden_temp_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".0001 - Foo.md.123.tmp"), "partial").unwrap();

        let index = index_local_files(dir.path()).unwrap();
        assert!(index.entries.is_empty());
        assert_eq!(index.unknown_markdown, 0);
    }
}
