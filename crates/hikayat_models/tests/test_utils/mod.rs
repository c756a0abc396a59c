//! Test utilities for Hikayat model tests.
//!
//! This module provides a canned-response HTTP server standing in for the
//! Gemini REST endpoint.

pub mod mock_server;

#[allow(unused_imports)]
pub use mock_server::{MockServer, RecordedRequest};

use hikayat_rate_limit::HikayatConfig;

/// Configuration pointing the client at `base_url` with default tiers and no retry.
#[allow(dead_code)]
pub fn config_for(base_url: &str) -> HikayatConfig {
    let mut config = HikayatConfig::default();
    config.models.base_url = base_url.to_string();
    config.models.request_timeout_secs = 5;
    config
}
