//! Story analysis and image rendering traits.

use async_trait::async_trait;
use hikayat_core::{ImageArtifact, StoryAnalysis, StoryText};
use hikayat_error::HikayatResult;
use std::sync::Arc;

/// Splits a story into ordered scene outlines.
///
/// Any transport, parse or quota problem is a single failure; implementations
/// never return partial results.
#[async_trait]
pub trait StoryAnalyzer: Send + Sync {
    /// Analyze the story text into scenes.
    async fn analyze(&self, story: &StoryText) -> HikayatResult<StoryAnalysis>;

    /// Model identifier (e.g., "gemini-2.5-flash").
    fn model_name(&self) -> &str;
}

/// Turns one visual prompt into one illustration.
///
/// A call that succeeds without an image payload must be reported as an error.
#[async_trait]
pub trait ImageRenderer: Send + Sync {
    /// Render a single illustration.
    async fn render(&self, visual_prompt: &str) -> HikayatResult<ImageArtifact>;

    /// Model identifier (e.g., "gemini-3-pro-image-preview").
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: StoryAnalyzer + ?Sized> StoryAnalyzer for Arc<T> {
    async fn analyze(&self, story: &StoryText) -> HikayatResult<StoryAnalysis> {
        (**self).analyze(story).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<T: ImageRenderer + ?Sized> ImageRenderer for Arc<T> {
    async fn render(&self, visual_prompt: &str) -> HikayatResult<ImageArtifact> {
        (**self).render(visual_prompt).await
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
