// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Vectorize API Module
//!
//! POST /vectorize: `{"text": "..."}` in, `{"vector": [...]}` out.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::vectorize_handler;
pub use request::{VectorizeRequest, BODY_TOO_LARGE_MESSAGE, TEXT_REQUIRED_MESSAGE};
pub use response::VectorizeResponse;
