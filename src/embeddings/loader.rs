// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding model configuration and the one-shot startup loader.

use crate::embeddings::{OnnxEmbeddingModel, TextEmbedder};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

pub const DEFAULT_MODEL_NAME: &str = "all-MiniLM-L6-v2";
pub const DEFAULT_DIMENSIONS: usize = 384;
pub const DEFAULT_MAX_LENGTH: usize = 256;
pub const DEFAULT_INTRA_THREADS: usize = 4;

pub const MODEL_FILE_NAME: &str = "model.onnx";
pub const TOKENIZER_FILE_NAME: &str = "tokenizer.json";

/// Configuration for loading an embedding model
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingModelConfig {
    /// Model name (e.g., "all-MiniLM-L6-v2")
    pub name: String,
    /// Path to ONNX model file
    pub model_path: PathBuf,
    /// Path to tokenizer JSON file
    pub tokenizer_path: PathBuf,
    /// Expected embedding dimensions; `None` accepts whatever the model outputs
    pub dimensions: Option<usize>,
    /// Tokenizer truncation length
    pub max_length: usize,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
    /// Scale output vectors to unit length
    pub normalize: bool,
}

impl EmbeddingModelConfig {
    /// Config for a directory laid out as `<dir>/model.onnx` + `<dir>/tokenizer.json`,
    /// with default tuning.
    pub fn from_dir(name: impl Into<String>, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            name: name.into(),
            model_path: dir.join(MODEL_FILE_NAME),
            tokenizer_path: dir.join(TOKENIZER_FILE_NAME),
            dimensions: Some(DEFAULT_DIMENSIONS),
            max_length: DEFAULT_MAX_LENGTH,
            intra_threads: DEFAULT_INTRA_THREADS,
            normalize: true,
        }
    }
}

/// Loads the configured model once and hands it back behind the
/// [`TextEmbedder`] seam.
///
/// Callers decide what a failure means; the binary keeps serving and
/// reports the model as not loaded.
pub async fn load_embedder(config: EmbeddingModelConfig) -> Result<Arc<dyn TextEmbedder>> {
    let name = config.name.clone();
    info!(
        "Loading embedding model {} from {}",
        name,
        config.model_path.display()
    );
    let started = Instant::now();

    match OnnxEmbeddingModel::new(config).await {
        Ok(model) => {
            info!(
                "✓ Loaded embedding model {} ({} dimensions) in {:?}",
                name,
                model.dimension(),
                started.elapsed()
            );
            Ok(Arc::new(model))
        }
        Err(e) => {
            error!("✗ Failed to load embedding model {}: {:#}", name, e);
            Err(e)
        }
    }
}
