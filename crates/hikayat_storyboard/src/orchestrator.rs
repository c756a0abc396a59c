//! Scene orchestrator: analysis, render fan-out, and retries.
//!
//! The board lives in a [`watch`] channel. All writes are read-modify-write
//! closures run under the channel's lock against the board as it is *now*,
//! never against a copy captured before an await.

use crate::board::{Epoch, RenderOutcome, RenderTicket, SceneBoard};
use hikayat_core::messages::RENDER_FAILED;
use hikayat_core::{SceneId, SceneStatus, StoryText};
use hikayat_error::{StoryError, StoryErrorKind};
use hikayat_interface::{ImageRenderer, StoryAnalyzer};
use hikayat_rate_limit::StoryboardSettings;
use std::sync::Arc;
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Orchestrator tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoryboardOptions {
    /// Cap on simultaneous render calls; `None` fans out without limit
    pub max_concurrent_renders: Option<usize>,
}

impl From<StoryboardSettings> for StoryboardOptions {
    fn from(settings: StoryboardSettings) -> Self {
        Self {
            max_concurrent_renders: settings.max_concurrent_renders,
        }
    }
}

/// How a submission's analysis ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SubmissionOutcome {
    /// Scenes installed and their renders started
    #[display("analyzed into {} scenes", scenes)]
    Analyzed {
        /// Number of scenes
        scenes: usize,
    },
    /// Analysis failed; the general error is showing
    #[display("analysis failed")]
    AnalysisFailed,
    /// A newer submission took over before analysis finished
    #[display("superseded")]
    Superseded,
}

/// Handle to one story submission.
///
/// Dropping it does not cancel anything; renders keep running and land on
/// the board.
#[derive(Debug)]
pub struct Submission {
    epoch: Epoch,
    outcome: SubmissionOutcome,
    renders: Vec<JoinHandle<RenderOutcome>>,
}

impl Submission {
    /// Epoch assigned to this submission.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// How analysis ended.
    pub fn outcome(&self) -> SubmissionOutcome {
        self.outcome
    }

    /// Wait for every initial render of this submission.
    ///
    /// A render task that panicked is logged and left out.
    pub async fn settle(self) -> Vec<RenderOutcome> {
        let mut outcomes = Vec::with_capacity(self.renders.len());
        for handle in self.renders {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => warn!(epoch = %self.epoch, error = %e, "Render task did not complete"),
            }
        }
        outcomes
    }
}

/// Ends the analysis of `epoch` if `submit_story` is dropped mid-analysis.
struct AnalysisGuard<'a> {
    board: &'a watch::Sender<SceneBoard>,
    epoch: Epoch,
    armed: bool,
}

impl AnalysisGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for AnalysisGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let epoch = self.epoch;
        if self.board.send_if_modified(|board| board.abandon_analysis(epoch)) {
            debug!(%epoch, "Submission dropped during analysis");
        }
    }
}

/// Turns a story into an illustrated storyboard.
///
/// Cheap to clone; clones share the board and collaborators.
///
/// # Example
///
/// ```rust,ignore
/// let storyboard = Storyboard::new(analyzer, renderer);
/// let submission = storyboard.submit_story(StoryText::new(text)?).await;
/// let board = storyboard.wait_until_settled().await;
/// for scene in board.scenes() {
///     println!("{} {}", scene.id(), scene.status_kind());
/// }
/// ```
#[derive(Clone)]
pub struct Storyboard {
    analyzer: Arc<dyn StoryAnalyzer>,
    renderer: Arc<dyn ImageRenderer>,
    board: Arc<watch::Sender<SceneBoard>>,
    render_permits: Option<Arc<Semaphore>>,
}

impl std::fmt::Debug for Storyboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let board = self.board.borrow();
        f.debug_struct("Storyboard")
            .field("analyzer", &self.analyzer.model_name())
            .field("renderer", &self.renderer.model_name())
            .field("epoch", &board.epoch())
            .field("scenes", &board.len())
            .finish_non_exhaustive()
    }
}

impl Storyboard {
    /// Orchestrator with unbounded render fan-out.
    pub fn new(analyzer: Arc<dyn StoryAnalyzer>, renderer: Arc<dyn ImageRenderer>) -> Self {
        Self::with_options(analyzer, renderer, StoryboardOptions::default())
    }

    /// Orchestrator with explicit options.
    pub fn with_options(
        analyzer: Arc<dyn StoryAnalyzer>,
        renderer: Arc<dyn ImageRenderer>,
        options: StoryboardOptions,
    ) -> Self {
        let (board, _) = watch::channel(SceneBoard::default());
        let render_permits = options
            .max_concurrent_renders
            .map(|n| Arc::new(Semaphore::new(n.max(1))));

        Self {
            analyzer,
            renderer,
            board: Arc::new(board),
            render_permits,
        }
    }

    /// Receiver notified on every board change.
    pub fn subscribe(&self) -> watch::Receiver<SceneBoard> {
        self.board.subscribe()
    }

    /// Copy of the current board.
    pub fn snapshot(&self) -> SceneBoard {
        self.board.borrow().clone()
    }

    /// Analyze `story` and start drawing every scene.
    ///
    /// Replaces whatever the board showed before. Resolves once analysis is
    /// done; the returned [`Submission`] can be used to await the renders.
    /// Dropping the future mid-analysis leaves the board empty and settled.
    /// Must be called within a Tokio runtime.
    #[instrument(skip(self, story), fields(chars = story.char_count()))]
    pub async fn submit_story(&self, story: StoryText) -> Submission {
        let mut epoch = Epoch::default();
        self.board.send_modify(|board| epoch = board.begin_submission());
        info!(%epoch, model = self.analyzer.model_name(), "Analyzing story");

        let mut guard = AnalysisGuard {
            board: &self.board,
            epoch,
            armed: true,
        };
        let analysis = self.analyzer.analyze(&story).await;
        // Both outcomes below end the analysis without awaiting.
        guard.disarm();

        let analysis = analysis.and_then(|analysis| {
            if analysis.is_empty() {
                Err(StoryError::new(StoryErrorKind::NoScenes).into())
            } else {
                Ok(analysis)
            }
        });

        let analysis = match analysis {
            Ok(analysis) => analysis,
            Err(error) => {
                warn!(%epoch, error = %error, "Story analysis failed");
                let current = self.board.send_if_modified(|board| board.fail_analysis(epoch));
                let outcome = if current {
                    SubmissionOutcome::AnalysisFailed
                } else {
                    debug!(%epoch, "Analysis failure superseded, dropped");
                    SubmissionOutcome::Superseded
                };
                return Submission {
                    epoch,
                    outcome,
                    renders: Vec::new(),
                };
            }
        };

        let mut tickets = None;
        self.board.send_if_modified(|board| {
            tickets = board.install_scenes(epoch, analysis);
            tickets.is_some()
        });

        let Some(tickets) = tickets else {
            debug!(%epoch, "Analysis superseded, dropped");
            return Submission {
                epoch,
                outcome: SubmissionOutcome::Superseded,
                renders: Vec::new(),
            };
        };

        info!(%epoch, scenes = tickets.len(), "Story analyzed, drawing scenes");
        let scenes = tickets.len();
        let renders = tickets
            .into_iter()
            .map(|ticket| self.spawn_render(ticket))
            .collect();

        Submission {
            epoch,
            outcome: SubmissionOutcome::Analyzed { scenes },
            renders,
        }
    }

    /// Draw scene `id` of the current submission and record the result.
    ///
    /// The scene goes back to pending immediately. Returns
    /// [`RenderOutcome::Skipped`] if there is no such scene. The render runs
    /// as its own task, so dropping this future does not strand the scene.
    /// Must be called within a Tokio runtime.
    #[instrument(skip(self), fields(scene_id = %id))]
    pub async fn render_scene(&self, id: SceneId) -> RenderOutcome {
        let Some(ticket) = self.begin_render(id) else {
            return RenderOutcome::Skipped;
        };
        match self.spawn_render(ticket).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Render task did not complete");
                RenderOutcome::Discarded
            }
        }
    }

    /// Redraw scene `id` in the background with the same prompt.
    ///
    /// `None` (and no state change) if the current submission has no such
    /// scene. The scene is pending by the time this returns. Must be called
    /// within a Tokio runtime.
    #[instrument(skip(self), fields(scene_id = %id))]
    pub fn retry_scene(&self, id: SceneId) -> Option<JoinHandle<RenderOutcome>> {
        let Some(ticket) = self.begin_render(id) else {
            debug!("Retry for unknown scene ignored");
            return None;
        };
        info!(epoch = %ticket.epoch(), attempt = ticket.attempt(), "Retrying scene");
        Some(self.spawn_render(ticket))
    }

    /// Wait until analysis is done and no scene is pending; returns that board.
    pub async fn wait_until_settled(&self) -> SceneBoard {
        let mut receiver = self.board.subscribe();
        match receiver.wait_for(SceneBoard::is_settled).await {
            Ok(board) => (*board).clone(),
            Err(_) => self.snapshot(),
        }
    }

    fn begin_render(&self, id: SceneId) -> Option<RenderTicket> {
        let mut ticket = None;
        self.board.send_if_modified(|board| {
            ticket = board.begin_render(id);
            ticket.is_some()
        });
        ticket
    }

    fn spawn_render(&self, ticket: RenderTicket) -> JoinHandle<RenderOutcome> {
        let storyboard = self.clone();
        tokio::spawn(async move { storyboard.execute(ticket).await })
    }

    async fn execute(&self, ticket: RenderTicket) -> RenderOutcome {
        let _permit = match &self.render_permits {
            Some(permits) => permits.clone().acquire_owned().await.ok(),
            None => None,
        };

        // A panicking renderer fails the scene like any other render error.
        let renderer = Arc::clone(&self.renderer);
        let prompt = ticket.prompt().clone();
        let rendered = tokio::spawn(async move { renderer.render(&prompt).await }).await;

        let status = match rendered {
            Ok(Ok(artifact)) => SceneStatus::Ready(artifact),
            Ok(Err(error)) => {
                warn!(
                    epoch = %ticket.epoch(),
                    scene_id = %ticket.id(),
                    attempt = ticket.attempt(),
                    error = %error,
                    "Scene render failed"
                );
                SceneStatus::Failed(RENDER_FAILED.to_string())
            }
            Err(error) => {
                warn!(
                    epoch = %ticket.epoch(),
                    scene_id = %ticket.id(),
                    attempt = ticket.attempt(),
                    error = %error,
                    "Scene render task aborted"
                );
                SceneStatus::Failed(RENDER_FAILED.to_string())
            }
        };

        let mut outcome = RenderOutcome::Discarded;
        self.board.send_if_modified(|board| {
            outcome = board.resolve(&ticket, status);
            matches!(outcome, RenderOutcome::Applied(_))
        });

        match outcome {
            RenderOutcome::Discarded => debug!(
                epoch = %ticket.epoch(),
                scene_id = %ticket.id(),
                attempt = ticket.attempt(),
                "Stale render result discarded"
            ),
            _ => debug!(
                scene_id = %ticket.id(),
                attempt = ticket.attempt(),
                %outcome,
                "Render result applied"
            ),
        }
        outcome
    }
}
