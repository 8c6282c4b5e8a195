//! JSON bodies exchanged with `POST /api/edit-image`.

use serde::{Deserialize, Serialize};

/// Path of the edit endpoint.
pub const EDIT_IMAGE_PATH: &str = "/api/edit-image";

/// Edit request: canvas image, mask and prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    /// Canvas image as a data URI.
    pub image: String,
    /// Black/white mask as a data URI.
    pub mask: String,
    /// What to do with the white region.
    pub prompt: String,
}

/// Successful (possibly degraded) edit response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditResponse {
    /// Edited image as a data URI or URL; absent when nothing came back.
    #[serde(
        rename = "editedImage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub edited_image: Option<String>,
    /// Human readable status.
    #[serde(default)]
    pub message: String,
}

/// Error body for 4xx/5xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human readable error.
    pub error: String,
}

impl ErrorBody {
    /// Create an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_uses_camel_case_field() {
        let response = EditResponse {
            edited_image: Some("data:image/png;base64,AAAA".into()),
            message: "ok".into(),
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["editedImage"], "data:image/png;base64,AAAA");
        assert_eq!(json["message"], "ok");
    }

    #[test]
    fn test_response_without_image() {
        let response: EditResponse =
            serde_json::from_str(r#"{"message":"nothing"}"#).expect("parse");
        assert!(response.edited_image.is_none());
    }
}
