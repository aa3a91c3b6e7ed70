//! Data models for Keepmark

mod local;
mod note;

pub use local::{LocalEntry, LocalIndex};
pub use note::{
    AttachmentRef, LinkAnnotation, ListItem, RemoteNote, WireAttachment, WireLink, WireListItem,
    WireNote,
};
