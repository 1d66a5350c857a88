// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_TEXT_CHARS: usize = 8192;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Per-request limits enforced by the HTTP layer
#[derive(Debug, Clone, PartialEq)]
pub struct RequestLimits {
    /// Maximum characters accepted in `text`; `None` disables the check
    pub max_text_chars: Option<usize>,
    /// Upper bound on a single inference call; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_text_chars: Some(DEFAULT_MAX_TEXT_CHARS),
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub limits: RequestLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            limits: RequestLimits::default(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid listen host: {}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
