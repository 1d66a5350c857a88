// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::api::http_server::AppState;
use crate::version::{FEATURES, VERSION};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
}

/// GET /health
///
/// Always 200; `degraded` while no model is loaded so load balancers can
/// tell a live process from a useful one.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let model = state.current_model().await;
    let features: Vec<String> = FEATURES.iter().map(|f| f.to_string()).collect();

    let response = match model {
        Some(model) => HealthResponse {
            status: "healthy".to_string(),
            version: VERSION.to_string(),
            features,
            model: Some(model.model_name().to_string()),
            dimension: Some(model.dimension()),
            issues: None,
        },
        None => HealthResponse {
            status: "degraded".to_string(),
            version: VERSION.to_string(),
            features,
            model: None,
            dimension: None,
            issues: Some(vec!["Embedding model is not loaded".to_string()]),
        },
    };

    Json(response)
}
