// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use serde::{Deserialize, Serialize};

/// Response body for POST /vectorize
///
/// # Example
/// ```json
/// { "vector": [0.012, -0.083, ...] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VectorizeResponse {
    pub vector: Vec<f32>,
}

impl From<Vec<f32>> for VectorizeResponse {
    fn from(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}
