//! keepmark-core - Core library for Keepmark
//!
//! This crate contains the models, change detection, file lifecycle, and
//! the reconciliation driver that keeps a local markdown tree in step with
//! a remote notes service.

pub mod detect;
pub mod error;
pub mod fingerprint;
pub mod lifecycle;
pub mod markdown;
pub mod media;
pub mod models;
pub mod naming;
pub mod remote;
pub mod resolve;
pub mod scan;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{AttachmentRef, LocalEntry, RemoteNote};
pub use remote::{HttpRemoteClient, RemoteSource};
pub use sync::{run_sync, SyncOptions, SyncSummary};
