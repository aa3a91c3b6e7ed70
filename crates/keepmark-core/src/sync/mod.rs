//! Reconciliation driver: one full sync pass over remote and local state.
//!
//! Durable state lives only in the exported files' headers, so a pass is
//! idempotent: re-running after a crash converges to the same tree.
//! Orphan deletion runs before matched/new processing, so a rename can
//! take over a freed filename instead of getting a suffix.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::detect::{self, ChangeKind};
use crate::error::Result;
use crate::fingerprint;
use crate::lifecycle;
use crate::markdown;
use crate::media;
use crate::models::{LocalEntry, RemoteNote};
use crate::naming::{self, NamingPolicy};
use crate::remote::RemoteSource;
use crate::resolve;
use crate::scan::{self, MEDIA_DIR};

/// Options for one sync pass, as exposed to the CLI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Delete local entries whose remote note is gone.
    pub delete_local: bool,
    /// Rename local files when the derived filename changes.
    pub rename_local: bool,
    /// Date-prefix filenames instead of incrementing counters.
    pub date_prefix_naming: bool,
    /// Skip media fetches when the local digest already matches.
    pub skip_existing_media: bool,
    /// Embed the frontmatter header. Without it files cannot be matched
    /// on later passes.
    pub include_header: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            delete_local: false,
            rename_local: false,
            date_prefix_naming: false,
            skip_existing_media: true,
            include_header: true,
        }
    }
}

impl SyncOptions {
    fn naming_policy(self) -> NamingPolicy {
        if self.date_prefix_naming {
            NamingPolicy::DatePrefix
        } else {
            NamingPolicy::Counter
        }
    }
}

/// Tally of one sync pass, suitable for CLI reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub renamed: usize,
    pub unchanged: usize,
    pub orphans_kept: usize,
    pub notes_deleted: usize,
    pub notes_failed: usize,
    pub media_downloaded: usize,
    pub media_skipped: usize,
    pub media_deleted: usize,
    /// Per-note and per-attachment failures, in occurrence order.
    pub warnings: Vec<String>,
}

/// Run one full reconciliation pass.
///
/// Fatal errors are limited to the remote listing and the local scan;
/// per-note and per-attachment failures land in the summary instead.
pub async fn run_sync(
    remote: &dyn RemoteSource,
    notes_dir: &Path,
    options: &SyncOptions,
) -> Result<SyncSummary> {
    let notes = remote.list_notes().await?;
    info!(count = notes.len(), "pulled remote notes");

    fs::create_dir_all(notes_dir)?;
    let media_root = notes_dir.join(MEDIA_DIR);
    fs::create_dir_all(&media_root)?;

    let index = scan::index_local_files(notes_dir)?;
    info!(
        notes = index.entries.len(),
        unknown_markdown = index.unknown_markdown,
        media_files = index.media_files,
        "indexed local files"
    );

    let resolution = resolve::resolve(notes, index);
    let mut summary = SyncSummary::default();
    let mut next_counter = resolution.next_counter;

    // Deletions first, so freed names are reusable by renames below.
    for entry in &resolution.orphaned {
        apply_orphan_policy(entry, options, &mut summary);
    }
    for duplicate in &resolution.duplicate_note_files {
        apply_duplicate_policy(duplicate, options, &mut summary);
    }

    for (note, entry) in resolution.matched {
        let remote_id = note.remote_id.clone();
        let result = process_matched(
            remote,
            notes_dir,
            &media_root,
            options,
            note,
            entry,
            &mut next_counter,
            &mut summary,
        )
        .await;
        record_note_result(&remote_id, result, &mut summary);
    }

    for note in resolution.fresh {
        let remote_id = note.remote_id.clone();
        let result = create_note(
            remote,
            notes_dir,
            &media_root,
            options,
            note,
            &mut next_counter,
            &mut summary,
        )
        .await;
        record_note_result(&remote_id, result, &mut summary);
    }

    info!(
        created = summary.created,
        updated = summary.updated,
        renamed = summary.renamed,
        unchanged = summary.unchanged,
        deleted = summary.notes_deleted,
        failed = summary.notes_failed,
        "sync pass finished"
    );
    Ok(summary)
}

fn record_note_result(remote_id: &str, result: Result<()>, summary: &mut SyncSummary) {
    if let Err(error) = result {
        let message = format!("note {remote_id}: {error}");
        warn!("{message}");
        summary.warnings.push(message);
        summary.notes_failed += 1;
    }
}

fn apply_orphan_policy(entry: &LocalEntry, options: &SyncOptions, summary: &mut SyncSummary) {
    if !options.delete_local {
        info!(remote_id = %entry.remote_id, "orphaned locally, kept (enable delete_local to remove)");
        summary.orphans_kept += 1;
        return;
    }
    match lifecycle::delete_entry(entry) {
        Ok(outcome) => {
            info!(remote_id = %entry.remote_id, "deleted orphaned entry");
            summary.notes_deleted += outcome.notes;
            summary.media_deleted += outcome.media;
        }
        Err(error) => {
            let message = format!("deleting orphan {}: {error}", entry.remote_id);
            warn!("{message}");
            summary.warnings.push(message);
            summary.notes_failed += 1;
        }
    }
}

fn apply_duplicate_policy(path: &Path, options: &SyncOptions, summary: &mut SyncSummary) {
    if !options.delete_local {
        summary.orphans_kept += 1;
        return;
    }
    match lifecycle::delete_file(path) {
        Ok(removed) => summary.notes_deleted += usize::from(removed),
        Err(error) => {
            let message = format!("deleting duplicate {}: {error}", path.display());
            warn!("{message}");
            summary.warnings.push(message);
            summary.notes_failed += 1;
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn process_matched(
    remote: &dyn RemoteSource,
    notes_dir: &Path,
    media_root: &Path,
    options: &SyncOptions,
    note: RemoteNote,
    entry: LocalEntry,
    next_counter: &mut u32,
    summary: &mut SyncSummary,
) -> Result<()> {
    delete_stale_media(&note, &entry, options, summary);

    let policy = options.naming_policy();
    let ordinal = match entry.filename().and_then(naming::parse_counter_prefix) {
        Some(ordinal) => ordinal,
        None => allocate_ordinal(policy, next_counter),
    };
    let derived = policy.derive(&note, ordinal);

    match detect::detect(&note, &entry, &derived) {
        ChangeKind::Unchanged => {
            summary.unchanged += 1;
            Ok(())
        }
        ChangeKind::RenameOnly => rename_in_place(notes_dir, &entry, &derived, options, summary),
        ChangeKind::ContentChanged => {
            // A media-only entry has no markdown file yet; exporting one
            // is a creation, not an update.
            let had_file = entry.path.is_some();
            write_note(
                remote, notes_dir, media_root, options, &note, &derived,
                entry.path.as_deref(),
                summary,
            )
            .await?;
            if had_file {
                summary.updated += 1;
            } else {
                summary.created += 1;
            }
            Ok(())
        }
    }
}

async fn create_note(
    remote: &dyn RemoteSource,
    notes_dir: &Path,
    media_root: &Path,
    options: &SyncOptions,
    note: RemoteNote,
    next_counter: &mut u32,
    summary: &mut SyncSummary,
) -> Result<()> {
    let policy = options.naming_policy();
    let ordinal = allocate_ordinal(policy, next_counter);
    let derived = policy.derive(&note, ordinal);

    info!(remote_id = %note.remote_id, "exporting new note");
    write_note(
        remote, notes_dir, media_root, options, &note, &derived, None, summary,
    )
    .await?;
    summary.created += 1;
    Ok(())
}

/// Serialize the note to its target path, fetching media first.
///
/// When the target differs from `current` (title changed and renames are
/// enabled), this is the combined update+rename: new content lands under
/// the new name and the old file goes away in the same pass.
#[allow(clippy::too_many_arguments)]
async fn write_note(
    remote: &dyn RemoteSource,
    notes_dir: &Path,
    media_root: &Path,
    options: &SyncOptions,
    note: &RemoteNote,
    derived: &str,
    current: Option<&Path>,
    summary: &mut SyncSummary,
) -> Result<()> {
    let outcome =
        media::materialize_note_media(remote, note, media_root, options.skip_existing_media).await;
    summary.media_downloaded += outcome.downloaded;
    summary.media_skipped += outcome.skipped;
    summary.warnings.extend(outcome.warnings);

    let media_links: Vec<String> = outcome
        .files
        .iter()
        .filter_map(|(_, path)| path.file_name().map(|name| name.to_string_lossy().into_owned()))
        .map(|filename| format!("{MEDIA_DIR}/{}/{filename}", note.remote_id))
        .collect();

    let target = match current {
        Some(current) if !options.rename_local => current.to_path_buf(),
        Some(current) => naming::disambiguate(notes_dir, derived, Some(current))?,
        None => naming::disambiguate(notes_dir, derived, None)?,
    };

    // Attachments that never made it to disk stay out of the stored
    // fingerprint, so the next pass sees the note as changed and retries.
    let stored_fingerprint = if outcome.failed.is_empty() {
        fingerprint::note_fingerprint(note)
    } else {
        let mut settled = note.clone();
        settled
            .attachments
            .retain(|attachment| !outcome.failed.contains(&attachment.attachment_id));
        fingerprint::note_fingerprint(&settled)
    };

    let content = markdown::render_note(
        note,
        &stored_fingerprint,
        &media_links,
        options.include_header,
    );
    lifecycle::write_atomic(&target, content.as_bytes())?;

    if let Some(current) = current {
        if current != target {
            lifecycle::delete_file(current)?;
            summary.renamed += 1;
        }
    }
    Ok(())
}

/// A rename with no content change; the header on disk stays as-is.
fn rename_in_place(
    notes_dir: &Path,
    entry: &LocalEntry,
    derived: &str,
    options: &SyncOptions,
    summary: &mut SyncSummary,
) -> Result<()> {
    if !options.rename_local {
        summary.unchanged += 1;
        return Ok(());
    }
    let Some(current) = entry.path.as_deref() else {
        summary.unchanged += 1;
        return Ok(());
    };

    let target = naming::disambiguate(notes_dir, derived, Some(current))?;
    if target == current {
        summary.unchanged += 1;
        return Ok(());
    }

    lifecycle::rename_note(current, &target)?;
    info!(remote_id = %entry.remote_id, to = %target.display(), "renamed note");
    summary.renamed += 1;
    Ok(())
}

fn delete_stale_media(
    note: &RemoteNote,
    entry: &LocalEntry,
    options: &SyncOptions,
    summary: &mut SyncSummary,
) {
    if !options.delete_local {
        return;
    }
    for (attachment_id, path) in &entry.media {
        let still_remote = note
            .attachments
            .iter()
            .any(|attachment| attachment.attachment_id == *attachment_id);
        if still_remote {
            continue;
        }
        match lifecycle::delete_file(path) {
            Ok(removed) => summary.media_deleted += usize::from(removed),
            Err(error) => {
                let message = format!(
                    "deleting stale media {attachment_id} of note {}: {error}",
                    note.remote_id
                );
                warn!("{message}");
                summary.warnings.push(message);
            }
        }
    }
}

fn allocate_ordinal(policy: NamingPolicy, next_counter: &mut u32) -> u32 {
    match policy {
        NamingPolicy::Counter => {
            let ordinal = *next_counter;
            *next_counter = next_counter.saturating_add(1);
            ordinal
        }
        NamingPolicy::DatePrefix => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_cli_defaults() {
        let options = SyncOptions::default();
        assert!(!options.delete_local);
        assert!(!options.rename_local);
        assert!(!options.date_prefix_naming);
        assert!(options.skip_existing_media);
        assert!(options.include_header);
    }

    #[test]
    fn counter_ordinal_allocation_advances() {
        let mut next = 3;
        assert_eq!(allocate_ordinal(NamingPolicy::Counter, &mut next), 3);
        assert_eq!(allocate_ordinal(NamingPolicy::Counter, &mut next), 4);
        assert_eq!(allocate_ordinal(NamingPolicy::DatePrefix, &mut next), 0);
        assert_eq!(next, 5);
    }
}
