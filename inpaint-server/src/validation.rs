//! Input validation for untrusted data.
//!
//! Edit requests arrive as loosely typed JSON. Everything is checked here
//! before any decoding or network work happens.

use inpaint_core::EditRequest;
use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// `image`, `mask` or `prompt` is absent or empty.
    #[error("Missing required fields")]
    MissingFields,
}

impl ValidationError {
    /// Short label for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingFields => "missing_fields",
        }
    }
}

fn required(field: Option<String>) -> Result<String, ValidationError> {
    field
        .filter(|value| !value.is_empty())
        .ok_or(ValidationError::MissingFields)
}

/// Validate the fields of an edit request.
///
/// Empty strings count as missing. The prompt is neither trimmed nor length
/// checked here; blank prompts are rejected client-side.
///
/// # Errors
///
/// Returns [`ValidationError::MissingFields`] if any field is absent or empty.
pub fn validate_edit_request(
    image: Option<String>,
    mask: Option<String>,
    prompt: Option<String>,
) -> Result<EditRequest, ValidationError> {
    let image = required(image)?;
    let mask = required(mask)?;
    let prompt = required(prompt)?;

    Ok(EditRequest {
        image,
        mask,
        prompt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_valid_request() {
        let request = validate_edit_request(some("data:a"), some("data:b"), some("sky"))
            .expect("should be valid");
        assert_eq!(request.prompt, "sky");
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            validate_edit_request(some("a"), None, some("p")),
            Err(ValidationError::MissingFields)
        );
        assert_eq!(
            validate_edit_request(None, some("m"), some("p")),
            Err(ValidationError::MissingFields)
        );
        assert_eq!(
            validate_edit_request(some("a"), some("m"), None),
            Err(ValidationError::MissingFields)
        );
    }

    #[test]
    fn test_empty_counts_as_missing() {
        assert_eq!(
            validate_edit_request(some("a"), some(""), some("p")),
            Err(ValidationError::MissingFields)
        );
    }

    #[test]
    fn test_long_prompt_is_accepted() {
        let long = "x".repeat(5000);
        let request = validate_edit_request(some("a"), some("m"), Some(long.clone()))
            .expect("long prompts are valid");
        assert_eq!(request.prompt, long);
    }

    proptest::proptest! {
        #[test]
        fn any_non_empty_prompt_is_accepted(prompt in ".{1,64}", repeat in 1usize..200) {
            let prompt = prompt.repeat(repeat);
            let request = validate_edit_request(some("a"), some("m"), Some(prompt.clone()));
            proptest::prop_assert_eq!(request.map(|r| r.prompt), Ok(prompt));
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::MissingFields.to_string(),
            "Missing required fields"
        );
        assert_eq!(ValidationError::MissingFields.kind(), "missing_fields");
    }
}
