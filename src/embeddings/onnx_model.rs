// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! Runs a sentence-transformer model exported to ONNX (all-MiniLM-L6-v2 by
//! default) behind ONNX Runtime.
//!
//! Features:
//! - ONNX model loading from disk
//! - GPU acceleration via CUDA (with automatic CPU fallback)
//! - HuggingFace tokenization with truncation to `max_length`
//! - Models with or without a `token_type_ids` input
//! - Token-level outputs (mean pooled) and sentence-level outputs
//! - Optional L2 normalization
//! - Output dimension discovered by a validation inference at load time

use crate::embeddings::pooling::{l2_normalize, sentence_vector};
use crate::embeddings::{EmbeddingModelConfig, TextEmbedder};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ndarray::Array2;
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{Encoding, Tokenizer, TruncationParams};
use tracing::{debug, info, warn};

const TOKEN_TYPE_IDS_INPUT: &str = "token_type_ids";

/// ONNX-based sentence embedding model
///
/// # Thread Safety
/// All heavy fields are wrapped in Arc, so cloning is cheap. The session is
/// guarded by a mutex; inference runs on the blocking thread pool.
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    /// ONNX Runtime session
    session: Arc<Mutex<Session>>,

    /// HuggingFace tokenizer (truncation configured)
    tokenizer: Arc<Tokenizer>,

    /// Model name (e.g., "all-MiniLM-L6-v2")
    model_name: String,

    /// Output dimension, measured at load time
    dimension: usize,

    /// Maximum sequence length fed to the model
    max_length: usize,

    /// Whether pooled vectors are scaled to unit length
    normalize: bool,

    /// Whether the graph declares a `token_type_ids` input
    use_token_type_ids: bool,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("max_length", &self.max_length)
            .field("normalize", &self.normalize)
            .field("use_token_type_ids", &self.use_token_type_ids)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Loads the model and tokenizer described by `config`
    ///
    /// # Errors
    /// Returns error if:
    /// - Model or tokenizer file is missing or invalid
    /// - ONNX Runtime initialization fails
    /// - The validation inference fails or produces an unexpected shape
    /// - `config.dimensions` is set and the model disagrees
    ///
    /// # Example
    /// ```ignore
    /// let config = EmbeddingModelConfig::from_dir(
    ///     "all-MiniLM-L6-v2",
    ///     "./models/all-MiniLM-L6-v2-onnx",
    /// );
    /// let model = OnnxEmbeddingModel::new(config).await?;
    /// ```
    pub async fn new(config: EmbeddingModelConfig) -> Result<Self> {
        if !config.model_path.exists() {
            anyhow::bail!(
                "ONNX model file not found: {}",
                config.model_path.display()
            );
        }
        if !config.tokenizer_path.exists() {
            anyhow::bail!(
                "Tokenizer file not found: {}",
                config.tokenizer_path.display()
            );
        }

        // Session build and the validation pass are CPU bound
        tokio::task::spawn_blocking(move || Self::load_blocking(config))
            .await
            .context("Model loading task failed to complete")?
    }

    fn load_blocking(config: EmbeddingModelConfig) -> Result<Self> {
        let mut session = build_session(&config.model_path, config.intra_threads)?;

        let use_token_type_ids =
            accepts_token_type_ids(session.inputs.iter().map(|input| input.name.as_str()));
        debug!(
            "Model inputs: {:?}",
            session.inputs.iter().map(|i| i.name.as_str()).collect::<Vec<_>>()
        );

        let mut tokenizer = Tokenizer::from_file(&config.tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure tokenizer truncation: {}", e))?;

        // Validation inference; also tells us the output dimension
        let test_encoding = tokenizer
            .encode("validation test", true)
            .map_err(|e| anyhow!("Tokenizer validation failed: {}", e))?;
        let validation_vector = run_inference(&mut session, &test_encoding, use_token_type_ids)
            .context("Validation inference failed")?;
        let dimension = validation_vector.len();

        if dimension == 0 {
            anyhow::bail!("Model produced an empty embedding during validation");
        }
        if let Some(expected) = config.dimensions {
            if expected != dimension {
                anyhow::bail!(
                    "Model {} outputs {} dimensions (expected {})",
                    config.name,
                    dimension,
                    expected
                );
            }
        }

        info!(
            "✅ ONNX embedding model {} loaded ({} dimensions)",
            config.name, dimension
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name: config.name,
            dimension,
            max_length: config.max_length,
            normalize: config.normalize,
            use_token_type_ids,
        })
    }

    /// Generates the embedding for a single text
    ///
    /// Tokenization and the forward pass run on tokio's blocking pool.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = self.clone();
        let text = text.to_owned();

        tokio::task::spawn_blocking(move || model.embed_blocking(&text))
            .await
            .context("Embedding task failed to complete")?
    }

    /// Synchronous variant of [`OnnxEmbeddingModel::embed`]
    pub fn embed_blocking(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let mut embedding = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow!("ONNX session lock poisoned"))?;
            run_inference(&mut session, &encoding, self.use_token_type_ids)?
        };

        if embedding.len() != self.dimension {
            anyhow::bail!(
                "Unexpected embedding dimension: {} (expected {})",
                embedding.len(),
                self.dimension
            );
        }

        if self.normalize {
            l2_normalize(&mut embedding);
        }

        Ok(embedding)
    }

    /// Counts tokens in a text string, special tokens included, after truncation
    pub fn count_tokens(&self, text: &str) -> Result<usize> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        Ok(encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as usize)
            .sum())
    }

    /// Returns the output dimension of this model
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the truncation length
    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

#[async_trait]
impl TextEmbedder for OnnxEmbeddingModel {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        OnnxEmbeddingModel::embed(self, text).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// True when the graph declares a `token_type_ids` input. BERT-style exports
/// do; many distilled and sentence-level exports do not.
fn accepts_token_type_ids<'a>(input_names: impl IntoIterator<Item = &'a str>) -> bool {
    input_names
        .into_iter()
        .any(|name| name == TOKEN_TYPE_IDS_INPUT)
}

/// Builds an ONNX Runtime session, trying CUDA first and falling back to CPU.
fn build_session(model_path: &Path, intra_threads: usize) -> Result<Session> {
    info!("🚀 Initializing ONNX session from {}", model_path.display());

    let cuda_result = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CUDAExecutionProvider::default().build()])
        .context("Failed to set CUDA execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path);

    match cuda_result {
        Ok(session) => {
            info!("✅ CUDA execution provider initialized");
            Ok(session)
        }
        Err(e) => {
            warn!("⚠️  CUDA execution provider failed: {}", e);
            warn!("   Falling back to CPU execution provider");
            Session::builder()
                .context("Failed to create session builder")?
                .with_execution_providers([CPUExecutionProvider::default().build()])
                .context("Failed to set CPU execution provider")?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .context("Failed to set optimization level")?
                .with_intra_threads(intra_threads)
                .context("Failed to set intra threads")?
                .commit_from_file(model_path)
                .with_context(|| {
                    format!("Failed to load ONNX model from {}", model_path.display())
                })
        }
    }
}

/// Runs one forward pass for a single encoded text and returns the pooled,
/// unnormalized sentence vector.
fn run_inference(
    session: &mut Session,
    encoding: &Encoding,
    use_token_type_ids: bool,
) -> Result<Vec<f32>> {
    let seq_len = encoding.get_ids().len();

    let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
    let attention_mask: Vec<i64> = encoding
        .get_attention_mask()
        .iter()
        .map(|&m| m as i64)
        .collect();

    let input_ids_array = Array2::from_shape_vec((1, seq_len), input_ids)
        .context("Failed to create input_ids array")?;
    let attention_mask_array = Array2::from_shape_vec((1, seq_len), attention_mask.clone())
        .context("Failed to create attention_mask array")?;

    let outputs = if use_token_type_ids {
        let token_type_ids: Vec<i64> = encoding
            .get_type_ids()
            .iter()
            .map(|&t| t as i64)
            .collect();
        let token_type_ids_array = Array2::from_shape_vec((1, seq_len), token_type_ids)
            .context("Failed to create token_type_ids array")?;

        session.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids_array)?,
            "attention_mask" => Value::from_array(attention_mask_array)?,
            TOKEN_TYPE_IDS_INPUT => Value::from_array(token_type_ids_array)?
        ])?
    } else {
        session.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids_array)?,
            "attention_mask" => Value::from_array(attention_mask_array)?
        ])?
    };

    // Index [0] rather than by name: output names differ between exports
    let output = outputs[0]
        .try_extract_array::<f32>()
        .context("Failed to extract output tensor")?;

    sentence_vector(output.view(), &attention_mask)
}
