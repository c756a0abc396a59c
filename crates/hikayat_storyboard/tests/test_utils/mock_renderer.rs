//! Mock image renderer.

use super::{Gate, overloaded};
use async_trait::async_trait;
use hikayat_core::ImageArtifact;
use hikayat_error::HikayatResult;
use hikayat_interface::ImageRenderer;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, watch};

/// Scripted behavior for one call on a prompt.
enum Behavior {
    Succeed,
    Fail,
    Panic,
}

struct Step {
    behavior: Behavior,
    gate: Option<oneshot::Receiver<()>>,
}

/// Renderer whose image bytes are the prompt's bytes.
///
/// Calls succeed immediately unless a step was scripted for that prompt.
#[derive(Clone)]
pub struct MockRenderer {
    steps: Arc<Mutex<HashMap<String, VecDeque<Step>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    started: Arc<watch::Sender<usize>>,
    in_flight: Arc<Mutex<(usize, usize)>>,
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRenderer {
    /// Renderer that always succeeds.
    pub fn new() -> Self {
        let (started, _) = watch::channel(0);
        Self {
            steps: Arc::new(Mutex::new(HashMap::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            started: Arc::new(started),
            in_flight: Arc::new(Mutex::new((0, 0))),
        }
    }

    fn push(&self, prompt: &str, behavior: Behavior, gate: Option<oneshot::Receiver<()>>) {
        self.steps
            .lock()
            .expect("steps lock")
            .entry(prompt.to_string())
            .or_default()
            .push_back(Step { behavior, gate });
    }

    /// Next call on `prompt` fails.
    pub fn fail_next(&self, prompt: &str) -> &Self {
        self.push(prompt, Behavior::Fail, None);
        self
    }

    /// Next call on `prompt` panics.
    pub fn panic_next(&self, prompt: &str) -> &Self {
        self.push(prompt, Behavior::Panic, None);
        self
    }

    /// Next call on `prompt` succeeds once the gate opens.
    pub fn gate_success(&self, prompt: &str) -> Gate {
        let (gate, rx) = Gate::new();
        self.push(prompt, Behavior::Succeed, Some(rx));
        gate
    }

    /// Next call on `prompt` fails once the gate opens.
    #[allow(dead_code)]
    pub fn gate_failure(&self, prompt: &str) -> Gate {
        let (gate, rx) = Gate::new();
        self.push(prompt, Behavior::Fail, Some(rx));
        gate
    }

    /// Number of render calls started.
    pub fn call_count(&self) -> usize {
        self.prompts.lock().expect("prompts lock").len()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }

    /// Highest number of calls observed in flight at once.
    #[allow(dead_code)]
    pub fn max_in_flight(&self) -> usize {
        self.in_flight.lock().expect("in-flight lock").1
    }

    /// Wait until at least `n` calls have started.
    pub async fn wait_for_calls(&self, n: usize) {
        let mut rx = self.started.subscribe();
        rx.wait_for(|count| *count >= n)
            .await
            .expect("renderer alive");
    }

    /// Image the mock returns for `prompt`.
    pub fn image_for(prompt: &str) -> ImageArtifact {
        ImageArtifact::new("image/png", prompt.as_bytes().to_vec())
    }
}

#[async_trait]
impl ImageRenderer for MockRenderer {
    async fn render(&self, visual_prompt: &str) -> HikayatResult<ImageArtifact> {
        let step = self
            .steps
            .lock()
            .expect("steps lock")
            .get_mut(visual_prompt)
            .and_then(VecDeque::pop_front);

        {
            let mut in_flight = self.in_flight.lock().expect("in-flight lock");
            in_flight.0 += 1;
            in_flight.1 = in_flight.1.max(in_flight.0);
        }
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(visual_prompt.to_string());
        self.started.send_modify(|count| *count += 1);

        let behavior = match step {
            Some(Step { behavior, gate }) => {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                behavior
            }
            None => Behavior::Succeed,
        };

        self.in_flight.lock().expect("in-flight lock").0 -= 1;

        match behavior {
            Behavior::Succeed => Ok(Self::image_for(visual_prompt)),
            Behavior::Fail => Err(overloaded()),
            Behavior::Panic => panic!("renderer crashed on {:?}", visual_prompt),
        }
    }

    fn model_name(&self) -> &str {
        "mock-renderer"
    }
}
