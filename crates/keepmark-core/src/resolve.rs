//! Identity resolution: joins the remote note set to the local index.
//!
//! The stored remote id is the only join key. This is a pure partition of
//! both sets; no filesystem or network access happens here.

use std::path::PathBuf;

use crate::models::{LocalEntry, LocalIndex, RemoteNote};

/// The three-way partition a sync pass operates on.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Remote notes with a local counterpart.
    pub matched: Vec<(RemoteNote, LocalEntry)>,
    /// Remote notes never exported before.
    pub fresh: Vec<RemoteNote>,
    /// Local entries whose remote id was absent from this pull.
    pub orphaned: Vec<LocalEntry>,
    /// Extra files that repeated an already-claimed remote id; orphan
    /// candidates, never match targets.
    pub duplicate_note_files: Vec<PathBuf>,
    /// Next free ordinal for counter naming, carried from the scan.
    pub next_counter: u32,
}

/// Partition the remote pull against the local index.
#[must_use]
pub fn resolve(notes: Vec<RemoteNote>, mut index: LocalIndex) -> Resolution {
    let mut resolution = Resolution {
        duplicate_note_files: std::mem::take(&mut index.duplicate_note_files),
        next_counter: index.next_counter,
        ..Resolution::default()
    };

    for note in notes {
        match index.entries.remove(&note.remote_id) {
            Some(entry) => resolution.matched.push((note, entry)),
            None => resolution.fresh.push(note),
        }
    }

    resolution.orphaned = index.entries.into_values().collect();
    resolution
}
