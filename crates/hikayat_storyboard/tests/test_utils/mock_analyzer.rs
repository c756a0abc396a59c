//! Mock story analyzer.

use super::Gate;
use async_trait::async_trait;
use hikayat_core::{StoryAnalysis, StoryText};
use hikayat_error::{HikayatError, HikayatResult};
use hikayat_interface::StoryAnalyzer;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

struct Step {
    result: HikayatResult<StoryAnalysis>,
    gate: Option<oneshot::Receiver<()>>,
}

/// Analyzer replaying scripted results, one per call.
#[derive(Clone, Default)]
pub struct MockAnalyzer {
    steps: Arc<Mutex<VecDeque<Step>>>,
    stories: Arc<Mutex<Vec<String>>>,
}

impl MockAnalyzer {
    /// Analyzer with no scripted calls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next call succeeds with `analysis`.
    pub fn push_ok(&self, analysis: StoryAnalysis) -> &Self {
        self.push(Ok(analysis), None);
        self
    }

    /// Next call fails with `error`.
    pub fn push_err(&self, error: HikayatError) -> &Self {
        self.push(Err(error), None);
        self
    }

    /// Next call succeeds with `analysis` once the returned gate opens.
    pub fn push_gated_ok(&self, analysis: StoryAnalysis) -> Gate {
        let (gate, rx) = Gate::new();
        self.push(Ok(analysis), Some(rx));
        gate
    }

    /// Next call fails with `error` once the returned gate opens.
    #[allow(dead_code)]
    pub fn push_gated_err(&self, error: HikayatError) -> Gate {
        let (gate, rx) = Gate::new();
        self.push(Err(error), Some(rx));
        gate
    }

    fn push(&self, result: HikayatResult<StoryAnalysis>, gate: Option<oneshot::Receiver<()>>) {
        self.steps
            .lock()
            .expect("steps lock")
            .push_back(Step { result, gate });
    }

    /// Number of analyze calls made.
    pub fn call_count(&self) -> usize {
        self.stories.lock().expect("stories lock").len()
    }

    /// Story texts received, in call order.
    #[allow(dead_code)]
    pub fn stories(&self) -> Vec<String> {
        self.stories.lock().expect("stories lock").clone()
    }
}

#[async_trait]
impl StoryAnalyzer for MockAnalyzer {
    async fn analyze(&self, story: &StoryText) -> HikayatResult<StoryAnalysis> {
        self.stories
            .lock()
            .expect("stories lock")
            .push(story.as_str().to_string());

        let step = self
            .steps
            .lock()
            .expect("steps lock")
            .pop_front()
            .expect("unscripted analyze call");

        if let Some(gate) = step.gate {
            let _ = gate.await;
        }
        step.result
    }

    fn model_name(&self) -> &str {
        "mock-analyzer"
    }
}
