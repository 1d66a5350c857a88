// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use crate::config::{
    RequestLimits, ServerConfig, DEFAULT_HOST, DEFAULT_MAX_TEXT_CHARS, DEFAULT_PORT,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
use crate::embeddings::loader::{
    DEFAULT_DIMENSIONS, DEFAULT_INTRA_THREADS, DEFAULT_MAX_LENGTH, DEFAULT_MODEL_NAME,
    MODEL_FILE_NAME, TOKENIZER_FILE_NAME,
};
use crate::embeddings::EmbeddingModelConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Fabstir Vectorizer
///
/// Every flag can also be supplied through the environment variable listed
/// in `--help`; a `.env` file in the working directory is honoured.
#[derive(Parser, Debug, Clone)]
#[command(name = "fabstir-vectorizer")]
#[command(version)]
#[command(about = "Text-to-vector HTTP service backed by an ONNX sentence-embedding model", long_about = None)]
pub struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, env = "VECTORIZER_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to bind the HTTP server to
    #[arg(long, env = "VECTORIZER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory containing model.onnx and tokenizer.json
    #[arg(
        long,
        env = "EMBEDDING_MODEL_DIR",
        default_value = "./models/all-MiniLM-L6-v2-onnx"
    )]
    pub model_dir: PathBuf,

    /// ONNX model file (overrides <model-dir>/model.onnx)
    #[arg(long, env = "EMBEDDING_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Tokenizer file (overrides <model-dir>/tokenizer.json)
    #[arg(long, env = "EMBEDDING_TOKENIZER_PATH")]
    pub tokenizer_path: Option<PathBuf>,

    /// Name reported in logs and /health
    #[arg(long, env = "EMBEDDING_MODEL_NAME", default_value = DEFAULT_MODEL_NAME)]
    pub model_name: String,

    /// Expected output dimension; 0 accepts whatever the model produces
    #[arg(long, env = "EMBEDDING_DIMENSION", default_value_t = DEFAULT_DIMENSIONS)]
    pub dimension: usize,

    /// Tokenizer truncation length
    #[arg(long, env = "EMBEDDING_MAX_LENGTH", default_value_t = DEFAULT_MAX_LENGTH)]
    pub max_length: usize,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "ONNX_INTRA_THREADS", default_value_t = DEFAULT_INTRA_THREADS)]
    pub intra_threads: usize,

    /// Return raw pooled vectors instead of unit-length ones
    #[arg(long, env = "EMBEDDING_NO_NORMALIZE")]
    pub no_normalize: bool,

    /// Maximum characters accepted in `text`; 0 disables the check
    #[arg(long, env = "VECTORIZER_MAX_TEXT_CHARS", default_value_t = DEFAULT_MAX_TEXT_CHARS)]
    pub max_text_chars: usize,

    /// Per-request inference timeout in seconds; 0 disables the timeout
    #[arg(
        long,
        env = "VECTORIZER_REQUEST_TIMEOUT_SECS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS
    )]
    pub request_timeout_secs: u64,
}

impl Cli {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            limits: RequestLimits {
                max_text_chars: (self.max_text_chars > 0).then_some(self.max_text_chars),
                request_timeout: (self.request_timeout_secs > 0)
                    .then(|| Duration::from_secs(self.request_timeout_secs)),
            },
        }
    }

    pub fn model_config(&self) -> EmbeddingModelConfig {
        EmbeddingModelConfig {
            name: self.model_name.clone(),
            model_path: self
                .model_path
                .clone()
                .unwrap_or_else(|| self.model_dir.join(MODEL_FILE_NAME)),
            tokenizer_path: self
                .tokenizer_path
                .clone()
                .unwrap_or_else(|| self.model_dir.join(TOKENIZER_FILE_NAME)),
            dimensions: (self.dimension > 0).then_some(self.dimension),
            max_length: self.max_length,
            intra_threads: self.intra_threads,
            normalize: !self.no_normalize,
        }
    }
}
