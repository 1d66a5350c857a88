// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Fabstir Vectorizer

/// Semantic version number
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "vectorize",
    "onnx-runtime",
    "cuda-fallback",
    "mean-pooling",
    "l2-normalization",
    "health-check",
    "cors",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir Vectorizer {}", VERSION)
}
