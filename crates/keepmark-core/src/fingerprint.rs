//! Content fingerprints for change detection.
//!
//! A fingerprint is a SHA-256 digest in the canonical `sha256:<hex>` form,
//! computed over every note field the exported file renders except the
//! title. The title is deliberately excluded: a pure title edit changes
//! the derived filename, not the fingerprint, so it costs a rename instead
//! of a rewrite. Volatile fields (timestamps) never participate.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::models::RemoteNote;

/// Prefix for all digests produced by this module.
const PREFIX: &str = "sha256:";

/// Compute the content fingerprint of a remote note.
#[must_use]
pub fn note_fingerprint(note: &RemoteNote) -> String {
    let mut hasher = Sha256::new();

    feed(&mut hasher, "body", note.body.as_bytes());
    feed(&mut hasher, "pinned", &[u8::from(note.pinned)]);
    for label in &note.labels {
        feed(&mut hasher, "label", label.as_bytes());
    }
    for item in &note.list_items {
        feed(
            &mut hasher,
            if item.checked { "item:x" } else { "item:o" },
            item.text.as_bytes(),
        );
    }
    for link in &note.links {
        feed(&mut hasher, "link", link.url.as_bytes());
        feed(&mut hasher, "link-title", link.title.as_bytes());
    }
    for attachment in &note.attachments {
        feed(&mut hasher, "attachment", attachment.attachment_id.as_bytes());
        feed(&mut hasher, "digest", attachment.content_digest.as_bytes());
    }

    format!("{PREFIX}{:x}", hasher.finalize())
}

/// Compute the digest of a byte buffer.
#[must_use]
pub fn bytes_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{PREFIX}{:x}", hasher.finalize())
}

/// Compute the digest of a file's contents.
pub fn file_digest(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(bytes_digest(&content))
}

/// Compare two digests, tolerating a missing `sha256:` prefix on either side.
///
/// An empty digest never matches anything, including another empty digest;
/// "unknown" must not suppress a fetch.
#[must_use]
pub fn digests_match(left: &str, right: &str) -> bool {
    let left = left.strip_prefix(PREFIX).unwrap_or(left);
    let right = right.strip_prefix(PREFIX).unwrap_or(right);
    !left.is_empty() && left.eq_ignore_ascii_case(right)
}

/// Length-prefixed field framing so adjacent fields can never collide
/// (e.g. body "ab" + item "c" vs body "a" + item "bc").
fn feed(hasher: &mut Sha256, tag: &str, value: &[u8]) {
    hasher.update(tag.as_bytes());
    hasher.update(b":");
    hasher.update(u64::try_from(value.len()).unwrap_or(u64::MAX).to_le_bytes());
    hasher.update(value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttachmentRef, ListItem, RemoteNote};

    fn note() -> RemoteNote {
        RemoteNote {
            remote_id: "r1".to_string(),
            title: "Foo".to_string(),
            body: "body text".to_string(),
            list_items: vec![ListItem {
                text: "milk".to_string(),
                checked: false,
            }],
            links: vec![],
            pinned: false,
            labels: vec![],
            created_at: 100,
            updated_at: 200,
            attachments: vec![],
        }
    }

    #[test]
    fn fingerprint_has_prefix_and_is_deterministic() {
        let a = note_fingerprint(&note());
        let b = note_fingerprint(&note());
        assert!(a.starts_with("sha256:"));
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_ignores_title_and_timestamps() {
        let mut changed = note();
        changed.title = "Bar".to_string();
        changed.updated_at = 999;
        assert_eq!(note_fingerprint(&note()), note_fingerprint(&changed));
    }

    #[test]
    fn fingerprint_tracks_body_changes() {
        let mut changed = note();
        changed.body = "other".to_string();
        assert_ne!(note_fingerprint(&note()), note_fingerprint(&changed));
    }

    #[test]
    fn fingerprint_tracks_checklist_state() {
        let mut changed = note();
        changed.list_items[0].checked = true;
        assert_ne!(note_fingerprint(&note()), note_fingerprint(&changed));
    }

    #[test]
    fn fingerprint_tracks_pin_state_and_labels() {
        let mut pinned = note();
        pinned.pinned = true;
        assert_ne!(note_fingerprint(&note()), note_fingerprint(&pinned));

        let mut relabeled = note();
        relabeled.labels = vec!["groceries".to_string()];
        assert_ne!(note_fingerprint(&note()), note_fingerprint(&relabeled));
    }

    #[test]
    fn fingerprint_tracks_attachment_set() {
        let mut changed = note();
        changed.attachments =
            vec![AttachmentRef::new("a1", "image/png", "sha256:aa").unwrap()];
        assert_ne!(note_fingerprint(&note()), note_fingerprint(&changed));
    }

    #[test]
    fn digests_match_ignores_prefix_and_case() {
        assert!(digests_match("sha256:ABCD", "abcd"));
        assert!(digests_match("abcd", "sha256:abcd"));
        assert!(!digests_match("abcd", "abce"));
        assert!(!digests_match("", ""));
    }
}
