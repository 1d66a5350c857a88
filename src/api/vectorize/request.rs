// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! VectorizeRequest type for the POST /vectorize endpoint

use crate::api::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message returned when the body is missing, malformed, or has no `text`
pub const TEXT_REQUIRED_MESSAGE: &str = "Invalid request, 'text' field is required.";

/// Message returned when the body is larger than the JSON extractor accepts
pub const BODY_TOO_LARGE_MESSAGE: &str = "Invalid request, body exceeds the size limit.";

/// Request body for POST /vectorize
///
/// # Example
/// ```json
/// { "text": "What are your opening hours?" }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorizeRequest {
    /// Text to embed. Optional at the serde level so a missing field is
    /// reported as a 400 by [`VectorizeRequest::validate`].
    #[serde(default)]
    pub text: Option<String>,
}

impl VectorizeRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    /// Validates the request and returns the text to embed
    ///
    /// # Validation Rules
    /// 1. **text**: must be present
    /// 2. **whitespace**: cannot be empty or whitespace-only
    /// 3. **length**: at most `max_chars` characters when a limit is set
    pub fn validate(&self, max_chars: Option<usize>) -> Result<&str, ApiError> {
        let text = self
            .text
            .as_deref()
            .ok_or_else(|| ApiError::InvalidRequest(TEXT_REQUIRED_MESSAGE.to_string()))?;

        if text.trim().is_empty() {
            return Err(ApiError::ValidationError {
                field: "text".to_string(),
                message: "text cannot be empty or contain only whitespace".to_string(),
            });
        }

        if let Some(max_chars) = max_chars {
            let chars = text.chars().count();
            if chars > max_chars {
                return Err(ApiError::ValidationError {
                    field: "text".to_string(),
                    message: format!(
                        "text cannot exceed {} characters (got {} characters)",
                        max_chars, chars
                    ),
                });
            }
        }

        Ok(text)
    }
}

impl TryFrom<Value> for VectorizeRequest {
    type Error = ApiError;

    /// Accepts only a JSON object; arrays and scalars would otherwise
    /// deserialize positionally.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if !value.is_object() {
            return Err(ApiError::InvalidRequest(TEXT_REQUIRED_MESSAGE.to_string()));
        }
        serde_json::from_value(value)
            .map_err(|_| ApiError::InvalidRequest(TEXT_REQUIRED_MESSAGE.to_string()))
    }
}
