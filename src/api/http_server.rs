// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use super::handlers::health_handler;
use super::vectorize::vectorize_handler;
use crate::config::{RequestLimits, ServerConfig};
use crate::embeddings::TextEmbedder;

/// Shared state for every handler
///
/// The model slot stays `None` when startup loading fails; handlers report
/// that as "Model is not loaded." rather than the process refusing to start.
#[derive(Clone)]
pub struct AppState {
    pub embedding_model: Arc<RwLock<Option<Arc<dyn TextEmbedder>>>>,
    pub limits: RequestLimits,
}

impl AppState {
    pub fn new(limits: RequestLimits) -> Self {
        Self {
            embedding_model: Arc::new(RwLock::new(None)),
            limits,
        }
    }

    pub fn with_model(model: Arc<dyn TextEmbedder>, limits: RequestLimits) -> Self {
        Self {
            embedding_model: Arc::new(RwLock::new(Some(model))),
            limits,
        }
    }

    /// Empty state with default limits
    pub fn new_for_test() -> Self {
        Self::new(RequestLimits::default())
    }

    pub async fn set_embedding_model(&self, model: Arc<dyn TextEmbedder>) {
        *self.embedding_model.write().await = Some(model);
    }

    pub async fn current_model(&self) -> Option<Arc<dyn TextEmbedder>> {
        self.embedding_model.read().await.clone()
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/vectorize", post(vectorize_handler))
        .layer(TraceLayer::new_for_http())
        // The browser chat client calls us cross-origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the listener and serves until Ctrl+C or SIGTERM.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Vectorizer listening on http://{}", addr);
    info!("  Health:    GET  http://{}/health", addr);
    info!("  Vectorize: POST http://{}/vectorize", addr);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Vectorizer stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("⏹️  Shutdown signal received");
}
