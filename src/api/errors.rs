// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Error body returned by every endpoint: `{"error": "..."}`, plus `field`
/// for validation errors tied to one request field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{message}")]
    ValidationError { field: String, message: String },

    #[error("Model is not loaded.")]
    ModelNotLoaded,

    #[error("Vectorization failed: {0}")]
    InferenceFailed(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let field = match self {
            ApiError::ValidationError { field, .. } => Some(field.clone()),
            _ => None,
        };

        ErrorResponse {
            error: self.to_string(),
            field,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ModelNotLoaded | ApiError::InferenceFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
