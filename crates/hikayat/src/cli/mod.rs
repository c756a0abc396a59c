//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the hikayat binary.

mod analyze;
mod commands;
mod draw;
mod input;

pub use analyze::analyze_story;
pub use commands::{Cli, Commands};
pub use draw::{DrawOptions, draw_story};

use hikayat::{HikayatConfig, HikayatResult, ImageRenderer, StoryAnalyzer};
use std::sync::Arc;

/// Analyzer and renderer for the configured provider.
#[cfg(feature = "gemini")]
fn collaborators(
    config: &HikayatConfig,
    tier: Option<&str>,
) -> HikayatResult<(Arc<dyn StoryAnalyzer>, Arc<dyn ImageRenderer>)> {
    let client = Arc::new(hikayat::GeminiClient::from_config(config, tier)?);
    tracing::debug!(tier = %client.tier().name, "Gemini client ready");
    let analyzer: Arc<dyn StoryAnalyzer> = client.clone();
    let renderer: Arc<dyn ImageRenderer> = client;
    Ok((analyzer, renderer))
}

/// Analyzer and renderer for the configured provider.
#[cfg(not(feature = "gemini"))]
fn collaborators(
    _config: &HikayatConfig,
    _tier: Option<&str>,
) -> HikayatResult<(Arc<dyn StoryAnalyzer>, Arc<dyn ImageRenderer>)> {
    Err(hikayat::ConfigError::new("No model provider enabled. Rebuild with --features gemini").into())
}
