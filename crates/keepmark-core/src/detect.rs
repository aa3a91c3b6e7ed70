//! Change detection for matched (remote note, local entry) pairs.

use crate::fingerprint;
use crate::models::{LocalEntry, RemoteNote};

/// What a matched pair needs from this pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Fingerprint and derived filename both match; nothing to do.
    Unchanged,
    /// Content unchanged but the derived filename differs (title or date
    /// format edit); a move suffices, no rewrite.
    RenameOnly,
    /// Content fingerprint differs; the file must be re-serialized.
    ContentChanged,
}

/// Decide the required action for a matched pair.
///
/// `derived_name` is the filename the naming policy produces for the note
/// this pass. A missing stored fingerprint (e.g. a hand-stripped header
/// field) counts as changed, so the file gets rewritten into a known state.
#[must_use]
pub fn detect(note: &RemoteNote, entry: &LocalEntry, derived_name: &str) -> ChangeKind {
    let remote_fingerprint = fingerprint::note_fingerprint(note);
    let content_matches = entry
        .fingerprint
        .as_deref()
        .is_some_and(|stored| fingerprint::digests_match(stored, &remote_fingerprint));

    if !content_matches {
        return ChangeKind::ContentChanged;
    }

    match entry.filename() {
        Some(current) if current == derived_name => ChangeKind::Unchanged,
        Some(_) => ChangeKind::RenameOnly,
        // Media-only entry without a markdown file: re-export it.
        None => ChangeKind::ContentChanged,
    }
}
