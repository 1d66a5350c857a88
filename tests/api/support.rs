// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared helpers for the HTTP contract tests: a stub embedder and a
//! one-shot request driver.

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use fabstir_vectorizer::{
    api::{create_app, AppState},
    config::RequestLimits,
    embeddings::TextEmbedder,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // for `oneshot`

pub const STUB_MODEL: &str = "stub-minilm";
pub const STUB_DIMENSION: usize = 384;

/// Deterministic embedder: component `i` is `(len(text) + i) / 1000`.
pub struct StubEmbedder {
    pub dimension: usize,
    pub fail: bool,
    pub delay: Option<Duration>,
    /// Returns `Pending` once before answering, like a blocking-pool handoff
    pub yields: bool,
}

impl StubEmbedder {
    pub fn new() -> Self {
        Self {
            dimension: STUB_DIMENSION,
            fail: false,
            delay: None,
            yields: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new()
        }
    }

    pub fn yielding() -> Self {
        Self {
            yields: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl TextEmbedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.yields {
            tokio::task::yield_now().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            bail!("stub inference failure");
        }
        Ok((0..self.dimension)
            .map(|i| (text.len() + i) as f32 / 1000.0)
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        STUB_MODEL
    }
}

pub fn app_with(embedder: StubEmbedder, limits: RequestLimits) -> Router {
    create_app(AppState::with_model(Arc::new(embedder), limits))
}

pub fn app_with_model() -> Router {
    app_with(StubEmbedder::new(), RequestLimits::default())
}

pub fn app_without_model() -> Router {
    create_app(AppState::new_for_test())
}

/// POSTs `body` to /vectorize as JSON
pub async fn post_vectorize(app: Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/vectorize")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
