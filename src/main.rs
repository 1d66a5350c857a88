// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use fabstir_vectorizer::{
    api::{start_server, AppState},
    cli::Cli,
    embeddings::load_embedder,
    version,
};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("🚀 Starting {}", version::get_version_string());

    let cli = Cli::parse();
    let server_config = cli.server_config();
    let model_config = cli.model_config();

    let state = AppState::new(server_config.limits.clone());

    // The server still comes up without a model; /vectorize then answers 500
    info!("🧠 Loading embedding model {}...", model_config.name);
    match load_embedder(model_config.clone()).await {
        Ok(model) => {
            info!(
                "✅ Embedding model ready: {} ({} dimensions)",
                model.model_name(),
                model.dimension()
            );
            state.set_embedding_model(model).await;
        }
        Err(_) => {
            warn!("⚠️  Continuing without an embedding model");
            warn!(
                "   Expected {} and {}",
                model_config.model_path.display(),
                model_config.tokenizer_path.display()
            );
            warn!("   Set EMBEDDING_MODEL_DIR (or --model-dir) to a directory holding both files");
            warn!("   POST /vectorize will return 500 \"Model is not loaded.\"");
        }
    }

    start_server(&server_config, state).await?;

    info!("👋 Goodbye!");
    Ok(())
}
