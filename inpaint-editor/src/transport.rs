//! HTTP transport to the edit endpoint.

use async_trait::async_trait;
use inpaint_core::{EditRequest, EditResponse, EDIT_IMAGE_PATH};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

/// Errors that can occur when talking to the edit endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server URL provided is invalid.
    #[error("invalid edit server URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed (connection, TLS, etc.).
    #[error("edit request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("edit endpoint returned {status}: {message}")]
    Status {
        /// HTTP status.
        status: StatusCode,
        /// `error` field of the body, if any.
        message: String,
    },
}

/// Sends edit requests and fetches remote images.
#[async_trait]
pub trait EditTransport: Send + Sync {
    /// Submit one edit request.
    ///
    /// # Errors
    ///
    /// Fails on transport errors and non-2xx replies.
    async fn submit(&self, request: &EditRequest) -> Result<EditResponse, TransportError>;

    /// Download an image referenced by URL (when the provider answers with a
    /// link instead of a data URI).
    ///
    /// # Errors
    ///
    /// Fails on invalid URLs, transport errors and non-2xx replies.
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// reqwest-backed transport for `POST /api/edit-image`.
#[derive(Debug, Clone)]
pub struct HttpEditTransport {
    http: Client,
    endpoint: Url,
}

impl HttpEditTransport {
    /// Create a transport for the server at `base_url`.
    ///
    /// `base_url` may be the endpoint itself or just the host (in which case
    /// `/api/edit-image` is appended).
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] if the URL is malformed.
    /// Returns [`TransportError::Http`] if the HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let mut url = Url::parse(base_url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        if url.path().is_empty() || url.path() == "/" {
            url.set_path(EDIT_IMAGE_PATH);
        }

        let http = Client::builder()
            .user_agent(concat!("inpaint-editor/", env!("CARGO_PKG_VERSION")))
            // Disable proxy detection to avoid macOS system-configuration panic
            .no_proxy()
            .build()?;

        Ok(Self {
            http,
            endpoint: url,
        })
    }

    /// Endpoint requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[derive(serde::Deserialize)]
struct ErrorReply {
    #[serde(default)]
    error: String,
}

#[async_trait]
impl EditTransport for HttpEditTransport {
    async fn submit(&self, request: &EditRequest) -> Result<EditResponse, TransportError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorReply>()
                .await
                .map(|reply| reply.error)
                .unwrap_or_default();
            return Err(TransportError::Status { status, message });
        }

        Ok(response.json().await?)
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let url = Url::parse(url).map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status,
                message: String::new(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
