// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Startup loader tests

use fabstir_vectorizer::api::AppState;
use fabstir_vectorizer::embeddings::{load_embedder, EmbeddingModelConfig};

const MODEL_DIR: &str = "/workspace/models/all-MiniLM-L6-v2-onnx";

#[tokio::test]
async fn test_failed_load_leaves_slot_empty() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new_for_test();

    if let Ok(model) = load_embedder(EmbeddingModelConfig::from_dir("absent", dir.path())).await {
        state.set_embedding_model(model).await;
    }

    assert!(state.current_model().await.is_none());
}

#[tokio::test]
async fn test_error_names_missing_path() {
    let config = EmbeddingModelConfig::from_dir("absent", "/nonexistent/models/minilm");

    let err = load_embedder(config).await.err().unwrap();
    let message = format!("{:#}", err);

    assert!(message.contains("/nonexistent/models/minilm/model.onnx"), "{}", message);
}

#[tokio::test]
#[ignore] // Requires downloaded model files
async fn test_successful_load_fills_slot() {
    let state = AppState::new_for_test();
    let model = load_embedder(EmbeddingModelConfig::from_dir("all-MiniLM-L6-v2", MODEL_DIR))
        .await
        .expect("model should load");
    state.set_embedding_model(model).await;

    let model = state.current_model().await.unwrap();
    assert_eq!(model.model_name(), "all-MiniLM-L6-v2");
    assert_eq!(model.dimension(), 384);
}
