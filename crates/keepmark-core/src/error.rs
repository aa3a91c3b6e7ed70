//! Error types for keepmark-core

use thiserror::Error;

/// Result type alias using keepmark-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in keepmark-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote listing or note body unavailable; fatal to a sync pass
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    /// A single attachment could not be fetched; non-fatal
    #[error("Attachment fetch failed: {0}")]
    AttachmentFetch(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Filename disambiguation exhausted its retry budget
    #[error("Unresolvable naming collision for: {0}")]
    NamingCollision(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
