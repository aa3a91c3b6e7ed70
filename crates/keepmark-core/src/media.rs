//! Media materialization: puts attachment bytes on disk, skipping
//! unchanged content.
//!
//! Files live under `media/<remote_id>/<attachment_id>.<ext>` and are
//! content-addressed through the remote-declared digest: a local file
//! whose digest already matches is never re-fetched. One attachment
//! failing never aborts the rest of the note.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::fingerprint;
use crate::lifecycle;
use crate::models::{AttachmentRef, RemoteNote};
use crate::naming;
use crate::remote::RemoteSource;

/// Result of materializing one note's media.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaOutcome {
    /// Local media files in attachment order: `(attachment_id, path)`.
    pub files: Vec<(String, PathBuf)>,
    /// Attachments fetched and written this pass.
    pub downloaded: usize,
    /// Attachments skipped because the local digest already matched.
    pub skipped: usize,
    /// Per-attachment failures, recorded rather than raised.
    pub warnings: Vec<String>,
    /// Ids of attachments with no local bytes after this pass.
    pub failed: Vec<String>,
}

/// Ensure local files exist for every attachment of `note`.
pub async fn materialize_note_media(
    remote: &dyn RemoteSource,
    note: &RemoteNote,
    media_root: &Path,
    skip_existing: bool,
) -> MediaOutcome {
    let mut outcome = MediaOutcome::default();

    for attachment in &note.attachments {
        let target = media_path(media_root, note, attachment);

        if skip_existing && digest_already_matches(&target, attachment) {
            debug!(
                attachment_id = %attachment.attachment_id,
                path = %target.display(),
                "media digest unchanged, skipping fetch"
            );
            outcome.skipped += 1;
            outcome
                .files
                .push((attachment.attachment_id.clone(), target));
            continue;
        }

        match fetch_and_write(remote, note, attachment, &target).await {
            Ok(()) => {
                outcome.downloaded += 1;
                outcome
                    .files
                    .push((attachment.attachment_id.clone(), target));
            }
            Err(error) => {
                let message = format!(
                    "attachment {} of note {}: {error}",
                    attachment.attachment_id, note.remote_id
                );
                warn!("{message}");
                outcome.warnings.push(message);
                outcome.failed.push(attachment.attachment_id.clone());
                // A stale file from an earlier pass is still worth linking.
                if target.exists() {
                    outcome
                        .files
                        .push((attachment.attachment_id.clone(), target));
                }
            }
        }
    }

    outcome
}

/// Expected content-addressed path for an attachment.
#[must_use]
pub fn media_path(media_root: &Path, note: &RemoteNote, attachment: &AttachmentRef) -> PathBuf {
    let filename = format!(
        "{}.{}",
        naming::sanitize_component(&attachment.attachment_id),
        extension_for_mime(&attachment.mime_type)
    );
    media_root.join(&note.remote_id).join(filename)
}

/// Map a MIME type to a filename extension.
#[must_use]
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime.trim().to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "audio/3gpp" => "3gp",
        "audio/mpeg" => "mp3",
        "audio/ogg" => "ogg",
        "application/pdf" => "pdf",
        _ => "bin",
    }
}

fn digest_already_matches(target: &Path, attachment: &AttachmentRef) -> bool {
    if !target.exists() {
        return false;
    }
    match fingerprint::file_digest(target) {
        Ok(local) => fingerprint::digests_match(&local, &attachment.content_digest),
        Err(error) => {
            warn!(path = %target.display(), %error, "unable to digest local media, re-fetching");
            false
        }
    }
}

async fn fetch_and_write(
    remote: &dyn RemoteSource,
    note: &RemoteNote,
    attachment: &AttachmentRef,
    target: &Path,
) -> Result<()> {
    let bytes = remote.fetch_attachment(note, attachment).await?;
    lifecycle::write_atomic(target, &bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime(" IMAGE/JPEG "), "jpg");
        assert_eq!(extension_for_mime("application/x-unknown"), "bin");
    }

    #[test]
    fn test_media_path_nests_under_note_id() {
        let note = RemoteNote {
            remote_id: "r1".to_string(),
            title: String::new(),
            body: String::new(),
            list_items: vec![],
            links: vec![],
            pinned: false,
            labels: vec![],
            created_at: 0,
            updated_at: 0,
            attachments: vec![],
        };
        let attachment = AttachmentRef::new("a1", "image/png", "sha256:aa").unwrap();
        assert_eq!(
            media_path(Path::new("/out/media"), &note, &attachment),
            Path::new("/out/media/r1/a1.png")
        );
    }
}
