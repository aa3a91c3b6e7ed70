//! Remote notes source boundary.
//!
//! Reconciliation only ever sees this trait; the shipped HTTP client is
//! one implementation, test fakes are another.

mod http;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AttachmentRef, RemoteNote};

pub use http::HttpRemoteClient;

/// A remote service that owns the authoritative note set.
///
/// A failed [`list_notes`](RemoteSource::list_notes) aborts the pass
/// (identity resolution needs the full set); a failed
/// [`fetch_attachment`](RemoteSource::fetch_attachment) only degrades the
/// one attachment.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Pull the full remote note sequence, normalized.
    async fn list_notes(&self) -> Result<Vec<RemoteNote>>;

    /// Fetch the bytes of one attachment.
    async fn fetch_attachment(
        &self,
        note: &RemoteNote,
        attachment: &AttachmentRef,
    ) -> Result<Vec<u8>>;
}
