//! `POST /api/edit-image` handler.
//!
//! The request runs through a fixed sequence of stages:
//!
//! ```text
//! parse body → validate → decode data URIs → provider call
//!    (500)       (400)        (echo)          (simulated | echo | success)
//! ```
//!
//! Only a body that is not JSON produces a 5xx. Once the body has parsed,
//! every failure is answered with 200 and a degraded result so the editor
//! keeps working without a provider.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use inpaint_core::{EditRequest, EditResponse, ErrorBody};
use serde::Deserialize;
use thiserror::Error;

use crate::metrics::{self, EditOutcome};
use crate::provider::ProviderError;
use crate::validation::{validate_edit_request, ValidationError};
use crate::AppState;

/// Message sent with a successful provider edit.
pub const SUCCESS_MESSAGE: &str = "Image edited successfully";
/// Message sent with the simulated edit.
pub const SIMULATED_MESSAGE: &str =
    "Using simulated edit - Add ANTHROPIC_API_KEY environment variable for real AI editing";
/// Message sent when the original image is echoed back.
pub const ECHO_MESSAGE: &str =
    "Simulation mode - Original image returned. Configure API key for real AI editing.";
/// Error sent when the body cannot be processed.
pub const PROCESSING_ERROR: &str = "Failed to process image";

/// Failure of one pipeline stage.
#[derive(Debug, Error)]
pub enum EditPipelineError {
    /// Request body is not a JSON edit request.
    #[error("invalid request body: {0}")]
    Body(#[from] serde_json::Error),
    /// Required fields missing or out of range.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A data URI has no payload or the payload is not base64.
    #[error("cannot decode {field} data URI: {reason}")]
    Decode {
        /// Field that failed (`image` or `mask`).
        field: &'static str,
        /// What went wrong.
        reason: String,
    },
    /// No API key configured.
    #[error("no provider API key configured")]
    NotConfigured,
    /// Provider call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl EditPipelineError {
    /// Name of the stage that failed, for logs.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Body(_) => "parse",
            Self::Validation(_) => "validate",
            Self::Decode { .. } => "decode",
            Self::NotConfigured => "configure",
            Self::Provider(ProviderError::Multipart(_)) => "multipart",
            Self::Provider(ProviderError::Status { .. }) => "status",
            Self::Provider(ProviderError::Reply(_)) => "reply",
            Self::Provider(_) => "send",
        }
    }

    /// Whether the simulated edit (re-encoded input) should be returned.
    #[must_use]
    pub fn wants_simulated_edit(&self) -> bool {
        match self {
            Self::NotConfigured => true,
            Self::Provider(err) => err.is_rejection(),
            _ => false,
        }
    }
}

/// Raw body as sent by the editor. Fields are optional so that a missing
/// field is a validation failure rather than a parse failure.
#[derive(Debug, Default, Deserialize)]
struct EditBody {
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    mask: Option<String>,
    #[serde(default)]
    prompt: Option<String>,
}

/// Standard alphabet, padding optional, stray trailing bits tolerated.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decoded request payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImages {
    /// Canvas image bytes.
    pub image: Vec<u8>,
    /// Mask image bytes.
    pub mask: Vec<u8>,
}

/// Decode the payload after the first comma of a data URI.
///
/// The media type is not checked. ASCII whitespace in the payload is skipped
/// and padding is optional.
///
/// # Errors
///
/// Returns [`EditPipelineError::Decode`] if there is no comma or the payload
/// is not base64.
pub fn decode_data_uri(field: &'static str, uri: &str) -> Result<Vec<u8>, EditPipelineError> {
    let payload = uri.split(',').nth(1).ok_or(EditPipelineError::Decode {
        field,
        reason: "missing payload".to_string(),
    })?;
    let payload: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    LENIENT_BASE64
        .decode(payload)
        .map_err(|e| EditPipelineError::Decode {
            field,
            reason: e.to_string(),
        })
}

/// Parse and validate a request body.
///
/// # Errors
///
/// Returns [`EditPipelineError::Body`] for malformed JSON and
/// [`EditPipelineError::Validation`] for missing fields.
pub fn parse_edit_request(body: &[u8]) -> Result<EditRequest, EditPipelineError> {
    let raw: EditBody = serde_json::from_slice(body)?;
    Ok(validate_edit_request(raw.image, raw.mask, raw.prompt)?)
}

/// Decode both data URIs of a validated request.
///
/// # Errors
///
/// Returns [`EditPipelineError::Decode`] naming the field that failed.
pub fn decode_request(request: &EditRequest) -> Result<DecodedImages, EditPipelineError> {
    Ok(DecodedImages {
        image: decode_data_uri("image", &request.image)?,
        mask: decode_data_uri("mask", &request.mask)?,
    })
}

/// Run the stages after validation and pick the response.
///
/// Never fails: every error becomes one of the two fallbacks.
pub async fn resolve_edit(state: &AppState, request: &EditRequest) -> (EditOutcome, EditResponse) {
    let decoded = match decode_request(request) {
        Ok(decoded) => decoded,
        Err(err) => return echo_original(request, &err),
    };

    let result = match &state.provider {
        Some(provider) => provider
            .edit(decoded.image.clone(), decoded.mask, &request.prompt)
            .await
            .map_err(EditPipelineError::from),
        None => Err(EditPipelineError::NotConfigured),
    };

    match result {
        Ok(edited_image) => (
            EditOutcome::Success,
            EditResponse {
                edited_image,
                message: SUCCESS_MESSAGE.to_string(),
            },
        ),
        Err(err) if err.wants_simulated_edit() => {
            if let EditPipelineError::Provider(ProviderError::Status { status, body }) = &err {
                tracing::error!(%status, body = %body, "Provider rejected edit");
            } else {
                tracing::warn!(stage = err.stage(), "{err}; returning simulated edit");
            }
            (EditOutcome::ProviderFallback, simulated_edit(&decoded.image))
        }
        Err(err) => echo_original(request, &err),
    }
}

/// Simulated edit: the decoded input re-encoded as a PNG data URI.
#[must_use]
pub fn simulated_edit(image: &[u8]) -> EditResponse {
    EditResponse {
        edited_image: Some(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(image)
        )),
        message: SIMULATED_MESSAGE.to_string(),
    }
}

fn echo_original(request: &EditRequest, err: &EditPipelineError) -> (EditOutcome, EditResponse) {
    tracing::error!(stage = err.stage(), error = %err, "Edit pipeline failed; echoing original");
    (
        EditOutcome::EchoFallback,
        EditResponse {
            edited_image: Some(request.image.clone()),
            message: ECHO_MESSAGE.to_string(),
        },
    )
}

/// Edit endpoint.
#[tracing::instrument(name = "edit_image", skip(state, body), fields(body_len = body.len()))]
pub async fn edit_image_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let started = Instant::now();

    let (outcome, response) = match parse_edit_request(&body) {
        Ok(request) => {
            tracing::debug!(prompt_len = request.prompt.len(), "Processing edit request");
            let (outcome, body) = resolve_edit(&state, &request).await;
            (outcome, (StatusCode::OK, Json(body)).into_response())
        }
        Err(EditPipelineError::Validation(err)) => {
            tracing::warn!("Rejected edit request: {err}");
            metrics::record_validation_failure(err.kind());
            (
                EditOutcome::Rejected,
                (StatusCode::BAD_REQUEST, Json(ErrorBody::new(err.to_string()))).into_response(),
            )
        }
        Err(err) => {
            tracing::error!(stage = err.stage(), "Error processing image: {err}");
            (
                EditOutcome::Failed,
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(PROCESSING_ERROR)),
                )
                    .into_response(),
            )
        }
    };

    metrics::record_edit_request(outcome, started.elapsed().as_secs_f64());
    tracing::info!(outcome = outcome.as_str(), "Edit request finished");
    response
}
