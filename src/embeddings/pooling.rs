// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Pooling helpers for turning token-level model output into a sentence vector.

use anyhow::{bail, Context, Result};
use ndarray::{ArrayView2, ArrayViewD, Axis, Ix2};

/// Mean pooling over the sequence axis, weighted by the attention mask.
///
/// `token_embeddings` is `[seq_len, hidden_dim]`; `attention_mask` holds one
/// entry per token (1 for real tokens, 0 for padding). Positions beyond the
/// mask are treated as padding.
pub fn mean_pool(token_embeddings: ArrayView2<'_, f32>, attention_mask: &[i64]) -> Vec<f32> {
    let (seq_len, hidden_dim) = token_embeddings.dim();

    let mut pooled = vec![0.0f32; hidden_dim];
    let mut sum_mask = 0.0f32;

    for i in 0..seq_len {
        let mask_value = attention_mask.get(i).copied().unwrap_or(0) as f32;
        if mask_value == 0.0 {
            continue;
        }
        sum_mask += mask_value;
        for (acc, value) in pooled.iter_mut().zip(token_embeddings.row(i)) {
            *acc += value * mask_value;
        }
    }

    // Avoid division by zero for an all-padding sequence
    let denom = sum_mask.max(1e-9);
    for value in &mut pooled {
        *value /= denom;
    }

    pooled
}

/// Turns the first output tensor of a model into one sentence vector.
///
/// Token-level output `[batch, seq_len, hidden]` is mean pooled with
/// `attention_mask`; sentence-level output `[batch, hidden]` is returned as
/// is. Only the first batch row is read.
pub fn sentence_vector(output: ArrayViewD<'_, f32>, attention_mask: &[i64]) -> Result<Vec<f32>> {
    if output.shape().first().map_or(true, |&batch| batch == 0) {
        bail!("Model output has an empty batch: shape {:?}", output.shape());
    }

    match output.ndim() {
        3 => {
            let tokens = output
                .index_axis(Axis(0), 0)
                .into_dimensionality::<Ix2>()
                .context("Failed to view token embeddings as a matrix")?;
            Ok(mean_pool(tokens, attention_mask))
        }
        // already pooled by the graph
        2 => Ok(output.index_axis(Axis(0), 0).iter().copied().collect()),
        _ => bail!(
            "Model outputs unexpected shape {:?} (expected [batch, seq_len, hidden] or [batch, hidden])",
            output.shape()
        ),
    }
}

/// Scales `vector` in place to unit L2 norm. A zero vector is left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
