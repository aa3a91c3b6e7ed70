use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] keepmark_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(
        "No API endpoint configured. Pass --api-url or set KEEPMARK_API_URL to your notes bridge."
    )]
    MissingApiUrl,
    #[error("No access token configured. Pass --token or set KEEPMARK_TOKEN.")]
    MissingToken,
}
