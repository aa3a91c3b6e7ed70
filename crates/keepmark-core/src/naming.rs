//! Filename derivation for exported notes.
//!
//! Filenames are a display property only; the durable link to the remote
//! note lives in the file header. A derived name that is already taken by
//! an unrelated note gets a numeric suffix rather than overwriting.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{TimeZone, Utc};
use regex::Regex;

use crate::error::{Error, Result};
use crate::models::RemoteNote;

/// Maximum length of a derived filename, extension included.
const MAX_FILENAME_LEN: usize = 135;

/// How many disambiguation suffixes to try before giving up.
const MAX_COLLISION_ATTEMPTS: u32 = 100;

/// Configured rule for deriving a display filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingPolicy {
    /// `0001 - Title.md`, ordinal allocated at create time.
    Counter,
    /// `2024-03-01 - Title.md`, date taken from the note's creation time.
    DatePrefix,
}

impl NamingPolicy {
    /// Derive the filename for a note.
    ///
    /// `ordinal` is only consulted under [`NamingPolicy::Counter`]: an
    /// existing entry keeps the ordinal parsed from its current filename,
    /// a new entry gets the next free one.
    #[must_use]
    pub fn derive(self, note: &RemoteNote, ordinal: u32) -> String {
        let prefix = match self {
            Self::Counter => format!("{ordinal:04}"),
            Self::DatePrefix => Utc
                .timestamp_opt(note.created_at, 0)
                .single()
                .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap())
                .format("%Y-%m-%d")
                .to_string(),
        };

        let stem = sanitize_component(&format!("{prefix} - {}", note.display_title()));
        let stem = truncate_chars(&stem, MAX_FILENAME_LEN - ".md".len());
        format!("{stem}.md")
    }
}

/// Strip characters that are unsafe in filenames across platforms.
///
/// Replaces path separators and reserved punctuation with spaces, then
/// collapses runs of whitespace.
#[must_use]
pub fn sanitize_component(raw: &str) -> String {
    static UNSAFE: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();

    let unsafe_chars = UNSAFE.get_or_init(|| {
        Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).expect("Invalid regex")
    });
    let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex"));

    let replaced = unsafe_chars.replace_all(raw, " ");
    spaces.replace_all(replaced.trim(), " ").to_string()
}

/// Parse the `NNNN` ordinal prefix of a counter-named file, if present.
#[must_use]
pub fn parse_counter_prefix(filename: &str) -> Option<u32> {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let prefix = PREFIX.get_or_init(|| Regex::new(r"^(\d{4,}) - ").expect("Invalid regex"));
    prefix
        .captures(filename)?
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
}

/// Resolve `filename` inside `dir` to a path that does not collide with an
/// unrelated note's file.
///
/// `current` is the path the note already occupies, if any: landing on it
/// (directly or via a suffix tried on an earlier pass) is not a collision,
/// which is what keeps repeated passes from bouncing between names.
pub fn disambiguate(dir: &Path, filename: &str, current: Option<&Path>) -> Result<PathBuf> {
    let target = dir.join(filename);
    if is_free(&target, current) {
        return Ok(target);
    }

    let stem = filename.strip_suffix(".md").unwrap_or(filename);
    for attempt in 1..=MAX_COLLISION_ATTEMPTS {
        let candidate = dir.join(format!("{stem}.{attempt}.md"));
        if is_free(&candidate, current) {
            return Ok(candidate);
        }
    }

    Err(Error::NamingCollision(filename.to_string()))
}

fn is_free(candidate: &Path, current: Option<&Path>) -> bool {
    current == Some(candidate) || !candidate.exists()
}

fn truncate_chars(value: &str, max_len: usize) -> String {
    value.chars().take(max_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RemoteNote;
    use pretty_assertions::assert_eq;

    fn note(title: &str, created_at: i64) -> RemoteNote {
        RemoteNote {
            remote_id: "r1".to_string(),
            title: title.to_string(),
            body: String::new(),
            list_items: vec![],
            links: vec![],
            pinned: false,
            labels: vec![],
            created_at,
            updated_at: created_at,
            attachments: vec![],
        }
    }

    #[test]
    fn test_counter_naming() {
        let name = NamingPolicy::Counter.derive(&note("Groceries", 0), 7);
        assert_eq!(name, "0007 - Groceries.md");
    }

    #[test]
    fn test_date_prefix_naming() {
        // 2024-03-01 00:00:00 UTC
        let name = NamingPolicy::DatePrefix.derive(&note("Groceries", 1_709_251_200), 1);
        assert_eq!(name, "2024-03-01 - Groceries.md");
    }

    #[test]
    fn test_untitled_fallback() {
        let name = NamingPolicy::Counter.derive(&note("   ", 0), 1);
        assert_eq!(name, "0001 - untitled.md");
    }

    #[test]
    fn test_sanitize_strips_reserved_chars() {
        assert_eq!(sanitize_component("a/b:c?d"), "a b c d");
        assert_eq!(sanitize_component("  spaced   out  "), "spaced out");
    }

    #[test]
    fn test_derived_name_is_capped() {
        let long_title = "x".repeat(500);
        let name = NamingPolicy::Counter.derive(&note(&long_title, 0), 1);
        assert!(name.chars().count() <= MAX_FILENAME_LEN);
        assert!(name.ends_with(".md"));
    }

    #[test]
    fn test_parse_counter_prefix() {
        assert_eq!(parse_counter_prefix("0042 - Foo.md"), Some(42));
        assert_eq!(parse_counter_prefix("2024-03-01 - Foo.md"), None);
        assert_eq!(parse_counter_prefix("Foo.md"), None);
    }

    #[test]
    fn test_disambiguate_prefers_unsuffixed() {
        let dir = tempfile::tempdir().unwrap();
        let path = disambiguate(dir.path(), "a.md", None).unwrap();
        assert_eq!(path, dir.path().join("a.md"));
    }

    #[test]
    fn test_disambiguate_suffixes_on_collision() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "taken").unwrap();
        let path = disambiguate(dir.path(), "a.md", None).unwrap();
        assert_eq!(path, dir.path().join("a.1.md"));
    }

    #[test]
    fn test_disambiguate_keeps_current_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "other note").unwrap();
        let current = dir.path().join("a.1.md");
        std::fs::write(&current, "mine").unwrap();
        let path = disambiguate(dir.path(), "a.md", Some(&current)).unwrap();
        assert_eq!(path, current);
    }
}
