// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Model tests for embedding generation
//!
//! Tests marked `#[ignore]` need the all-MiniLM-L6-v2 export at MODEL_DIR:
//! `cargo test -- --ignored` once the files are in place.

use fabstir_vectorizer::embeddings::{EmbeddingModelConfig, OnnxEmbeddingModel, TextEmbedder};
use std::sync::Arc;

const MODEL_DIR: &str = "/workspace/models/all-MiniLM-L6-v2-onnx";

fn minilm_config() -> EmbeddingModelConfig {
    EmbeddingModelConfig::from_dir("all-MiniLM-L6-v2", MODEL_DIR)
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (na * nb)
}

#[tokio::test]
async fn test_missing_tokenizer_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("model.onnx"), b"not really onnx").unwrap();

    let result = OnnxEmbeddingModel::new(EmbeddingModelConfig::from_dir("m", dir.path())).await;

    let message = result.unwrap_err().to_string();
    assert!(message.contains("Tokenizer file not found"), "{}", message);
}

#[tokio::test]
async fn test_missing_model_reported_before_tokenizer() {
    let dir = tempfile::tempdir().unwrap();

    let result = OnnxEmbeddingModel::new(EmbeddingModelConfig::from_dir("m", dir.path())).await;

    let message = result.unwrap_err().to_string();
    assert!(message.contains("ONNX model file not found"), "{}", message);
}

#[tokio::test]
async fn test_corrupt_model_fails_on_blocking_pool() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("model.onnx"), b"not really onnx").unwrap();
    std::fs::write(dir.path().join("tokenizer.json"), b"{}").unwrap();

    let result = OnnxEmbeddingModel::new(EmbeddingModelConfig::from_dir("m", dir.path())).await;

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("Failed to load ONNX model"), "{}", message);
}

#[tokio::test]
#[ignore] // Requires downloaded model files
async fn test_model_loads_with_384_dimensions() {
    let model = OnnxEmbeddingModel::new(minilm_config())
        .await
        .expect("Failed to load model");

    assert_eq!(model.model_name(), "all-MiniLM-L6-v2");
    assert_eq!(model.dimension(), 384);
    assert_eq!(model.max_length(), 256);
}

#[tokio::test]
#[ignore] // Requires downloaded model files
async fn test_dimension_mismatch_rejected() {
    let config = EmbeddingModelConfig {
        dimensions: Some(512),
        ..minilm_config()
    };

    let err = OnnxEmbeddingModel::new(config).await.unwrap_err();
    assert!(err.to_string().contains("expected 512"), "{}", err);
}

#[tokio::test]
#[ignore] // Requires downloaded model files
async fn test_embedding_is_unit_length() {
    let model = OnnxEmbeddingModel::new(minilm_config()).await.unwrap();

    let embedding = model.embed("Hello world").await.unwrap();
    let magnitude = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();

    assert_eq!(embedding.len(), 384);
    assert!((magnitude - 1.0).abs() < 1e-3, "magnitude {}", magnitude);
}

#[tokio::test]
#[ignore] // Requires downloaded model files
async fn test_embedding_is_deterministic() {
    let model = OnnxEmbeddingModel::new(minilm_config()).await.unwrap();

    let a = model.embed("deterministic input").await.unwrap();
    let b = model.embed("deterministic input").await.unwrap();

    assert_eq!(a, b);
}

#[tokio::test]
#[ignore] // Requires downloaded model files
async fn test_similar_texts_score_higher() {
    let model = OnnxEmbeddingModel::new(minilm_config()).await.unwrap();

    let cat = model.embed("The cat sits on the mat").await.unwrap();
    let kitten = model.embed("A kitten is sitting on a rug").await.unwrap();
    let finance = model.embed("Quarterly revenue grew by 12 percent").await.unwrap();

    assert!(cosine(&cat, &kitten) > cosine(&cat, &finance));
}

#[tokio::test]
#[ignore] // Requires downloaded model files
async fn test_long_text_is_truncated() {
    let config = EmbeddingModelConfig {
        max_length: 32,
        ..minilm_config()
    };
    let model = OnnxEmbeddingModel::new(config).await.unwrap();
    let long_text = "token ".repeat(500);

    assert_eq!(model.count_tokens(&long_text).unwrap(), 32);
    assert_eq!(model.embed(&long_text).await.unwrap().len(), 384);
}

#[tokio::test]
#[ignore] // Requires downloaded model files
async fn test_concurrent_requests_through_trait() {
    let model: Arc<dyn TextEmbedder> = Arc::new(OnnxEmbeddingModel::new(minilm_config()).await.unwrap());

    let mut handles = Vec::new();
    for i in 0..8 {
        let model = model.clone();
        handles.push(tokio::spawn(async move {
            model.embed(&format!("concurrent text {}", i)).await
        }));
    }

    for handle in handles {
        let embedding = handle.await.unwrap().unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
