// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /vectorize HTTP handler

use crate::api::http_server::AppState;
use crate::api::vectorize::{
    VectorizeRequest, VectorizeResponse, BODY_TOO_LARGE_MESSAGE, TEXT_REQUIRED_MESSAGE,
};
use crate::api::ApiError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// POST /vectorize handler
///
/// The model check comes before body validation: with no model loaded every
/// request is a 500, whatever it carries.
///
/// # Errors
/// - 500 `Model is not loaded.` when startup loading failed
/// - 400 when the body is not JSON, has no `text`, or `text` is blank / too long
/// - 400 when the body exceeds the extractor's size limit
/// - 500 when inference fails
/// - 504 when inference exceeds the configured timeout (if one is set)
pub async fn vectorize_handler(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VectorizeResponse>, ApiError> {
    let model = state.current_model().await.ok_or_else(|| {
        warn!("Rejecting /vectorize request: no embedding model loaded");
        ApiError::ModelNotLoaded
    })?;

    let Json(body) = payload.map_err(|rejection| {
        debug!("Rejected /vectorize body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::InvalidRequest(BODY_TOO_LARGE_MESSAGE.to_string())
        } else {
            ApiError::InvalidRequest(TEXT_REQUIRED_MESSAGE.to_string())
        }
    })?;
    let request = VectorizeRequest::try_from(body)?;

    let text = request.validate(state.limits.max_text_chars)?;

    let started = Instant::now();
    let embedding = model.embed(text);
    let result = match state.limits.request_timeout {
        Some(timeout) => tokio::time::timeout(timeout, embedding).await.map_err(|_| {
            error!(
                "Vectorization timed out after {:?} ({} chars)",
                timeout,
                text.chars().count()
            );
            ApiError::Timeout(timeout)
        })?,
        None => embedding.await,
    };
    let vector = result.map_err(|e| {
        error!("Vectorization failed: {:#}", e);
        ApiError::InferenceFailed(e.to_string())
    })?;

    info!(
        "Vectorized {} chars into {} dimensions with {} in {:?}",
        text.chars().count(),
        vector.len(),
        model.model_name(),
        started.elapsed()
    );

    Ok(Json(VectorizeResponse::from(vector)))
}
