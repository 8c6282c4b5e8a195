//! Client for the upstream image-edit provider.
//!
//! Sends the decoded canvas and mask as a multipart form and returns whatever
//! the provider put in the `image` field of its reply. There is no retry and
//! no timeout beyond reqwest's defaults: one call per edit request.

use std::sync::Arc;
use std::time::Instant;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Default provider endpoint.
pub const DEFAULT_PROVIDER_URL: &str = "https://api.anthropic.com/v1/images/edit";

/// Value sent in the `anthropic-version` header.
pub const PROVIDER_API_VERSION: &str = "2024-01-01";

/// Errors that can occur when talking to the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The configured endpoint is not a valid URL.
    #[error("invalid provider URL: {0}")]
    InvalidUrl(String),
    /// A multipart part could not be built.
    #[error("failed to build multipart form: {0}")]
    Multipart(reqwest::Error),
    /// HTTP layer failed (connection, TLS, etc.).
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Status {
        /// HTTP status returned by the provider.
        status: StatusCode,
        /// Response body, as text.
        body: String,
    },
    /// The success reply was not the expected JSON.
    #[error("unreadable provider reply: {0}")]
    Reply(String),
}

impl ProviderError {
    /// Returns true when the provider itself refused the edit.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

/// JSON returned by the provider on success.
#[derive(Debug, Deserialize)]
struct ProviderReply {
    #[serde(default)]
    image: Option<String>,
}

/// HTTP client for the image-edit provider.
#[derive(Clone)]
pub struct ProviderClient {
    inner: Arc<InnerClient>,
}

struct InnerClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl ProviderClient {
    /// Create a client for `endpoint` authenticating with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidUrl`] if the URL is malformed.
    /// Returns [`ProviderError::Http`] if the HTTP client fails to build.
    pub fn new(endpoint: impl AsRef<str>, api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let endpoint = Url::parse(endpoint.as_ref())
            .map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .user_agent(concat!("inpaint-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(InnerClient {
                http,
                endpoint,
                api_key: api_key.into(),
            }),
        })
    }

    /// Provider endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Submit one edit. Returns the provider's `image` field, which may be
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Status`] for non-2xx replies and other
    /// variants for transport or decoding failures.
    pub async fn edit(
        &self,
        image: Vec<u8>,
        mask: Vec<u8>,
        prompt: &str,
    ) -> Result<Option<String>, ProviderError> {
        let form = build_form(image, mask, prompt)?;

        let started = Instant::now();
        let result = self
            .inner
            .http
            .post(self.inner.endpoint.clone())
            .header("x-api-key", &self.inner.api_key)
            .header("anthropic-version", PROVIDER_API_VERSION)
            .multipart(form)
            .send()
            .await;
        crate::metrics::record_provider_latency(started.elapsed().as_secs_f64());
        let response = result?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        let reply: ProviderReply =
            serde_json::from_slice(&bytes).map_err(|e| ProviderError::Reply(e.to_string()))?;
        Ok(reply.image)
    }
}

fn build_form(image: Vec<u8>, mask: Vec<u8>, prompt: &str) -> Result<Form, ProviderError> {
    let image = Part::bytes(image)
        .file_name("image.png")
        .mime_str("image/png")
        .map_err(ProviderError::Multipart)?;
    let mask = Part::bytes(mask)
        .file_name("mask.png")
        .mime_str("image/png")
        .map_err(ProviderError::Multipart)?;

    Ok(Form::new()
        .part("image", image)
        .part("mask", mask)
        .text("prompt", prompt.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_with_mock(server: &MockServer) -> ProviderClient {
        ProviderClient::new(format!("{}/v1/images/edit", server.uri()), "test-key").expect("client")
    }

    #[test]
    fn test_invalid_url_error() {
        let err = ProviderClient::new("not-a-valid-url", "key").expect_err("should fail");
        match err {
            ProviderError::InvalidUrl(_) => {}
            other => panic!("Expected InvalidUrl error, got: {other:?}"),
        }
    }

    #[test]
    fn test_only_status_errors_are_rejections() {
        let status = ProviderError::Status {
            status: StatusCode::BAD_REQUEST,
            body: "nope".into(),
        };
        assert!(status.is_rejection());
        assert!(!ProviderError::Reply("eof".into()).is_rejection());
        assert!(!ProviderError::InvalidUrl("x".into()).is_rejection());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = ProviderClient::new("https://example.com/edit", "secret-key").expect("client");
        let debug = format!("{client:?}");
        assert!(debug.contains("example.com"));
        assert!(!debug.contains("secret-key"));
    }

    #[tokio::test]
    #[cfg_attr(
        target_os = "macos",
        ignore = "wiremock/reqwest system-configuration issue on macOS"
    )]
    async fn edit_sends_headers_and_multipart_fields() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/images/edit"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", PROVIDER_API_VERSION))
            .and(body_string_contains("name=\"image\"; filename=\"image.png\""))
            .and(body_string_contains("name=\"mask\"; filename=\"mask.png\""))
            .and(body_string_contains("make it blue"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "image": "data:image/png;base64,QQ==" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_mock(&server);
        let image = client
            .edit(b"png-bytes".to_vec(), b"mask-bytes".to_vec(), "make it blue")
            .await
            .expect("edit");
        assert_eq!(image.as_deref(), Some("data:image/png;base64,QQ=="));
    }

    #[tokio::test]
    #[cfg_attr(
        target_os = "macos",
        ignore = "wiremock/reqwest system-configuration issue on macOS"
    )]
    async fn edit_reports_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such endpoint"))
            .mount(&server)
            .await;

        let err = client_with_mock(&server)
            .edit(vec![1], vec![2], "p")
            .await
            .expect_err("should fail");
        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, "no such endpoint");
            }
            other => panic!("Expected Status error, got: {other:?}"),
        }
    }

    #[tokio::test]
    #[cfg_attr(
        target_os = "macos",
        ignore = "wiremock/reqwest system-configuration issue on macOS"
    )]
    async fn edit_rejects_non_json_reply() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_with_mock(&server)
            .edit(vec![1], vec![2], "p")
            .await
            .expect_err("should fail");
        assert!(matches!(err, ProviderError::Reply(_)));
    }

    #[tokio::test]
    #[cfg_attr(
        target_os = "macos",
        ignore = "wiremock/reqwest system-configuration issue on macOS"
    )]
    async fn edit_allows_reply_without_image() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "x" })))
            .mount(&server)
            .await;

        let image = client_with_mock(&server)
            .edit(vec![1], vec![2], "p")
            .await
            .expect("edit");
        assert!(image.is_none());
    }

    #[tokio::test]
    async fn edit_reports_connection_failure() {
        let port = portpicker::pick_unused_port().expect("port");
        let client =
            ProviderClient::new(format!("http://127.0.0.1:{port}/edit"), "k").expect("client");
        let err = client.edit(vec![1], vec![2], "p").await.expect_err("should fail");
        assert!(matches!(err, ProviderError::Http(_)));
    }
}
