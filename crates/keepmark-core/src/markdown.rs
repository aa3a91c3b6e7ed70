//! Markdown rendering and header parsing for exported notes.
//!
//! The frontmatter header is what makes every sync pass resumable: the
//! `remote_id` and `fingerprint` lines are the only durable state the
//! reconciler has, so a lost or hand-edited file degrades to "unknown"
//! instead of corrupting the run.

use std::fmt::Write as _;

use crate::models::RemoteNote;

/// The durable sync state embedded in a note file's frontmatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub remote_id: String,
    pub fingerprint: String,
}

/// Render a note as markdown with an optional frontmatter header.
///
/// `media_links` are relative targets for the attached-media section, in
/// attachment order. Without a header the file cannot be matched on a
/// later pass.
#[must_use]
pub fn render_note(
    note: &RemoteNote,
    fingerprint: &str,
    media_links: &[String],
    include_header: bool,
) -> String {
    let mut output = String::new();

    if include_header {
        let _ = writeln!(output, "---");
        let _ = writeln!(output, "remote_id: {}", note.remote_id);
        let _ = writeln!(output, "fingerprint: {fingerprint}");
        let _ = writeln!(output, "title: {}", note.title);
        let _ = writeln!(output, "pinned: {}", note.pinned);
        let _ = writeln!(output, "created_at: {}", note.created_at);
        let _ = writeln!(output, "updated_at: {}", note.updated_at);
        if !note.labels.is_empty() {
            let _ = writeln!(output, "labels:");
            for label in &note.labels {
                let _ = writeln!(output, "  - {label}");
            }
        }
        let _ = writeln!(output, "---");
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "# {}", note.display_title());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Note");
    let _ = writeln!(output);
    let _ = writeln!(output, "{}", convert_checklist_glyphs(&note.body));

    if !note.list_items.is_empty() {
        let _ = writeln!(output);
        for item in &note.list_items {
            let marker = if item.checked { "x" } else { " " };
            let _ = writeln!(output, "- [{marker}] {}", item.text);
        }
    }

    if !note.links.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Links");
        let _ = writeln!(output);
        for link in &note.links {
            let _ = writeln!(output, "- [{}]({})", link.title, link.url);
        }
    }

    if !media_links.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Attached Media");
        let _ = writeln!(output);
        for link in media_links {
            let _ = writeln!(output, "![]({link})");
        }
    }

    output
}

/// Parse the sync header out of a note file's contents.
///
/// Returns `None` for files without frontmatter or with frontmatter that
/// carries no `remote_id`; such files are left alone by reconciliation.
#[must_use]
pub fn parse_header(content: &str) -> Option<Header> {
    let mut lines = content.lines();
    if lines.next()?.trim_end() != "---" {
        return None;
    }

    let mut remote_id = None;
    let mut fingerprint = None;
    for line in lines {
        if line.trim_end() == "---" {
            break;
        }
        if let Some(value) = line.strip_prefix("remote_id:") {
            remote_id = non_empty(value);
        } else if let Some(value) = line.strip_prefix("fingerprint:") {
            fingerprint = non_empty(value);
        }
    }

    Some(Header {
        remote_id: remote_id?,
        fingerprint: fingerprint.unwrap_or_default(),
    })
}

/// Convert checklist glyphs some remotes flatten into the body.
#[must_use]
pub fn convert_checklist_glyphs(body: &str) -> String {
    body.replace("\u{2611} ", "- [x] ")
        .replace("\u{2610} ", "- [ ] ")
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
