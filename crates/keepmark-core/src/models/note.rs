//! Remote note model and wire-payload normalization

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A checklist item attached to a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Item text.
    pub text: String,
    /// Whether the item is checked off.
    pub checked: bool,
}

/// A link annotation attached to a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAnnotation {
    /// Link target URL.
    pub url: String,
    /// Link display title (falls back to the URL when empty).
    pub title: String,
}

/// Reference to a binary attachment owned by the remote service.
///
/// Bytes are fetched separately; this carries enough metadata to decide
/// whether a fetch is needed at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// Stable attachment identifier.
    pub attachment_id: String,
    /// Content MIME type.
    pub mime_type: String,
    /// Content digest in `sha256:<hex>` form.
    pub content_digest: String,
}

impl AttachmentRef {
    /// Create a validated attachment reference.
    pub fn new(
        attachment_id: impl Into<String>,
        mime_type: impl Into<String>,
        content_digest: impl Into<String>,
    ) -> Result<Self> {
        let attachment_id = attachment_id.into().trim().to_string();
        let mime_type = mime_type.into().trim().to_string();
        let content_digest = content_digest.into().trim().to_string();

        if attachment_id.is_empty() {
            return Err(Error::InvalidInput(
                "Attachment id cannot be empty".to_string(),
            ));
        }
        if mime_type.is_empty() {
            return Err(Error::InvalidInput(
                "Attachment mime_type cannot be empty".to_string(),
            ));
        }
        // An empty digest is allowed: it means "unknown", and the
        // materializer then always fetches.
        Ok(Self {
            attachment_id,
            mime_type,
            content_digest,
        })
    }
}

/// A note as delivered by the remote service, normalized at the boundary.
///
/// The `remote_id` is the only durable join key to local files; the title
/// only influences the display filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNote {
    /// Opaque stable identifier owned by the remote service.
    pub remote_id: String,
    /// Note title, may be empty.
    pub title: String,
    /// Plain text body.
    pub body: String,
    /// Checklist items, in remote order.
    pub list_items: Vec<ListItem>,
    /// Link annotations, in remote order.
    pub links: Vec<LinkAnnotation>,
    /// Whether the note is pinned remotely.
    pub pinned: bool,
    /// Label names, in remote order.
    pub labels: Vec<String>,
    /// Creation timestamp (Unix seconds), immutable.
    pub created_at: i64,
    /// Last update timestamp (Unix seconds), non-decreasing.
    pub updated_at: i64,
    /// Binary attachments, in remote order.
    pub attachments: Vec<AttachmentRef>,
}

impl RemoteNote {
    /// Title used for filename derivation: trimmed, `"untitled"` when empty.
    #[must_use]
    pub fn display_title(&self) -> &str {
        let trimmed = self.title.trim();
        if trimmed.is_empty() {
            "untitled"
        } else {
            trimmed
        }
    }
}

/// Raw note payload as received from the remote service.
///
/// Every field except `id` is optional so upstream schema drift never
/// reaches reconciliation; [`RemoteNote`] is the only shape it sees.
#[derive(Debug, Clone, Deserialize)]
pub struct WireNote {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub list_items: Option<Vec<WireListItem>>,
    #[serde(default)]
    pub links: Option<Vec<WireLink>>,
    #[serde(default)]
    pub pinned: Option<bool>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub attachments: Option<Vec<WireAttachment>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireListItem {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireLink {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireAttachment {
    pub id: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub content_digest: Option<String>,
}

impl TryFrom<WireNote> for RemoteNote {
    type Error = Error;

    fn try_from(wire: WireNote) -> Result<Self> {
        let remote_id = wire.id.trim().to_string();
        if remote_id.is_empty() {
            return Err(Error::InvalidInput(
                "Remote note id cannot be empty".to_string(),
            ));
        }

        let attachments = wire
            .attachments
            .unwrap_or_default()
            .into_iter()
            .map(|attachment| {
                AttachmentRef::new(
                    attachment.id,
                    attachment
                        .mime_type
                        .unwrap_or_else(|| "application/octet-stream".to_string()),
                    attachment.content_digest.unwrap_or_default(),
                )
            })
            .collect::<Result<Vec<AttachmentRef>>>()?;

        Ok(Self {
            remote_id,
            title: wire.title.unwrap_or_default(),
            body: wire.body.unwrap_or_default(),
            list_items: wire
                .list_items
                .unwrap_or_default()
                .into_iter()
                .map(|item| ListItem {
                    text: item.text,
                    checked: item.checked,
                })
                .collect(),
            links: wire
                .links
                .unwrap_or_default()
                .into_iter()
                .map(|link| LinkAnnotation {
                    title: link.title.unwrap_or_else(|| link.url.clone()),
                    url: link.url,
                })
                .collect(),
            pinned: wire.pinned.unwrap_or(false),
            labels: wire.labels.unwrap_or_default(),
            created_at: wire.created_at.unwrap_or(0),
            updated_at: wire.updated_at.unwrap_or(0),
            attachments,
        })
    }
}
