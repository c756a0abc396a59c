//! Test utilities for storyboard tests.
//!
//! This module provides mock collaborators with call counters and gates that
//! hold a call open until the test releases it.

pub mod mock_analyzer;
pub mod mock_renderer;

#[allow(unused_imports)]
pub use mock_analyzer::MockAnalyzer;
#[allow(unused_imports)]
pub use mock_renderer::MockRenderer;

use hikayat_core::{SceneOutline, StoryAnalysis, StoryText};
use hikayat_error::{GeminiError, GeminiErrorKind, HikayatError};
use tokio::sync::oneshot;

/// Holds a mocked call open until [`Gate::open`] is called or the gate is dropped.
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    /// Create a gate and the receiver the mock waits on.
    pub fn new() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    /// Let the held call finish.
    pub fn open(self) {
        let _ = self.0.send(());
    }
}

/// Scene outline whose visual prompt is `prompt N`.
#[allow(dead_code)]
pub fn outline(n: usize) -> SceneOutline {
    SceneOutline {
        narrative_segment: format!("المشهد رقم {}", n),
        visual_prompt: format!("prompt {}", n),
        characters: format!("Karim, scene {}", n),
    }
}

/// Analysis with `count` scenes, prompts `prefix 1..=count`.
#[allow(dead_code)]
pub fn analysis_with_prefix(prefix: &str, count: usize) -> StoryAnalysis {
    StoryAnalysis::new(
        (1..=count)
            .map(|n| SceneOutline {
                narrative_segment: format!("{} segment {}", prefix, n),
                visual_prompt: format!("{} {}", prefix, n),
                characters: format!("{} characters", prefix),
            })
            .collect(),
    )
}

/// Analysis with `count` scenes, prompts `prompt 1..=count`.
#[allow(dead_code)]
pub fn analysis(count: usize) -> StoryAnalysis {
    StoryAnalysis::new((1..=count).map(outline).collect())
}

/// Transient provider error.
#[allow(dead_code)]
pub fn overloaded() -> HikayatError {
    GeminiError::new(GeminiErrorKind::HttpError {
        status_code: 503,
        message: "The model is overloaded".to_string(),
    })
    .into()
}

/// A valid story.
#[allow(dead_code)]
pub fn story(text: &str) -> StoryText {
    StoryText::new(text).expect("non-empty story")
}
