// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Sentence embedding backend
//!
//! The HTTP layer only sees [`TextEmbedder`]; the production implementation
//! is [`OnnxEmbeddingModel`], loaded once at startup via [`load_embedder`].

pub mod loader;
pub mod onnx_model;
pub mod pooling;

use anyhow::Result;
use async_trait::async_trait;

pub use loader::{load_embedder, EmbeddingModelConfig};
pub use onnx_model::OnnxEmbeddingModel;
pub use pooling::{l2_normalize, mean_pool, sentence_vector};

/// A model that turns one piece of text into a fixed-length vector.
///
/// Implementations must be `Send + Sync`; a single instance is shared by
/// every in-flight request.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embeds `text` into a vector of [`TextEmbedder::dimension`] floats.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every vector returned by [`TextEmbedder::embed`].
    fn dimension(&self) -> usize;

    /// Human-readable model name (e.g. "all-MiniLM-L6-v2").
    fn model_name(&self) -> &str;
}
