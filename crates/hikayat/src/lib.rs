//! Hikayat: illustrated storyboards from short stories.
//!
//! A story goes through two model calls:
//! 1. an analysis model splits it into 3 to 6 scenes, each with a narrative
//!    excerpt, a visual prompt and character notes
//! 2. an image model draws every scene, all at once, in one consistent
//!    children's-book style
//!
//! Scenes fail independently and can be redrawn one at a time.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use hikayat::{GeminiClient, HikayatConfig, StoryText, Storyboard};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HikayatConfig::load()?;
//!     let client = Arc::new(GeminiClient::from_config(&config, None)?);
//!     let storyboard = Storyboard::new(client.clone(), client);
//!
//!     storyboard.submit_story(StoryText::new("كان يا ما كان...")?).await;
//!     let board = storyboard.wait_until_settled().await;
//!     println!("{}", hikayat::summary_table(&board));
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `gemini` (default) - Google Gemini analyzer and renderer
//! - `api` - gate tests that call the live API
//!
//! # Architecture
//!
//! - `hikayat_core` - scene, story and image types
//! - `hikayat_interface` - analyzer and renderer traits
//! - `hikayat_error` - error types
//! - `hikayat_rate_limit` - configuration, quotas and retry
//! - `hikayat_models` - Gemini implementation
//! - `hikayat_storyboard` - orchestration and export
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod report;
mod telemetry;

pub use report::{ProgressTracker, SceneChange, summary_table};
pub use telemetry::init_console_telemetry;

pub use hikayat_core::{
    ImageArtifact, Scene, SceneId, SceneOutline, SceneOutlineBuilder, SceneStatus,
    SceneStatusKind, StoryAnalysis, StoryText, messages,
};
pub use hikayat_error::{
    ConfigError, GeminiError, GeminiErrorKind, HikayatError, HikayatErrorKind, HikayatResult,
    HttpError, JsonError, RateLimitError, RateLimitErrorKind, RetryableError, StorageError,
    StorageErrorKind, StoryError, StoryErrorKind,
};
pub use hikayat_interface::{ImageRenderer, StoryAnalyzer};
pub use hikayat_rate_limit::{
    HikayatConfig, ModelSettings, ModelTierConfig, ProviderConfig, RateLimiter,
    RateLimiterGuard, RetrySettings, StoryboardSettings, Tier, TierConfig,
};
pub use hikayat_storyboard::{
    Epoch, MANIFEST_FILE, ManifestEntry, RenderOutcome, RenderTicket, SceneBoard, Storyboard,
    StoryboardManifest, StoryboardOptions, Submission, SubmissionOutcome, export_storyboard,
    scene_file_name,
};

#[cfg(feature = "gemini")]
pub use hikayat_models::{GeminiClient, LlmMetrics};
