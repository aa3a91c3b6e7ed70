//! Bearer-authenticated HTTP implementation of [`RemoteSource`].
//!
//! Talks to a notes bridge exposing `GET /v1/notes` (JSON array of wire
//! notes) and `GET /v1/notes/{note}/attachments/{attachment}` (raw bytes).
//! Single attempt per request; retry policy belongs to the service side.

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::{AttachmentRef, RemoteNote, WireNote};
use crate::util::{compact_text, is_http_url, normalize_text_option};

use super::RemoteSource;

/// HTTP client for a remote notes bridge.
#[derive(Debug, Clone)]
pub struct HttpRemoteClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl HttpRemoteClient {
    /// Builds a client for an explicit API base URL and access token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into().as_str())?;
        let token = normalize_text_option(Some(token.into())).ok_or_else(|| {
            Error::InvalidInput("Access token must not be empty".to_string())
        })?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|error| Error::RemoteFetch(format!("Failed to construct HTTP client: {error}")))?;
        Ok(Self {
            base_url,
            token,
            client,
        })
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, url: String) -> std::result::Result<reqwest::Response, String> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|error| format!("Request failed: {error}"))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {status}: {}", compact_text(&body)));
        }
        Ok(response)
    }
}

#[async_trait]
impl RemoteSource for HttpRemoteClient {
    async fn list_notes(&self) -> Result<Vec<RemoteNote>> {
        let response = self
            .get(format!("{}/v1/notes", self.base_url))
            .await
            .map_err(Error::RemoteFetch)?;

        let payload = response
            .json::<Vec<WireNote>>()
            .await
            .map_err(|error| Error::RemoteFetch(format!("Invalid notes payload: {error}")))?;

        payload.into_iter().map(RemoteNote::try_from).collect()
    }

    async fn fetch_attachment(
        &self,
        note: &RemoteNote,
        attachment: &AttachmentRef,
    ) -> Result<Vec<u8>> {
        let url = format!(
            "{}/v1/notes/{}/attachments/{}",
            self.base_url, note.remote_id, attachment.attachment_id
        );
        let response = self.get(url).await.map_err(Error::AttachmentFetch)?;
        let bytes = response
            .bytes()
            .await
            .map_err(|error| Error::AttachmentFetch(format!("Failed to read bytes: {error}")))?;
        Ok(bytes.to_vec())
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let base = raw.trim().trim_end_matches('/').to_string();
    if base.is_empty() {
        return Err(Error::InvalidInput(
            "API base URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(&base) {
        return Err(Error::InvalidInput(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_base_url_rejects_invalid_values() {
        assert!(normalize_base_url("").is_err());
        assert!(normalize_base_url("example.com").is_err());
    }

    #[test]
    fn normalize_base_url_trims_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://api.example.com/").unwrap(),
            "https://api.example.com"
        );
    }

    #[test]
    fn client_rejects_blank_token() {
        assert!(HttpRemoteClient::new("https://api.example.com", "  ").is_err());
    }
}
