//! Storyboard state: the current submission and its scenes.
//!
//! Every write goes through a method that first checks it still concerns the
//! current submission (and, for renders, the latest attempt on that scene).
//! The orchestrator runs these methods under the watch channel's lock, so each
//! check-and-write is atomic.

use derive_getters::Getters;
use hikayat_core::messages::ANALYSIS_FAILED;
use hikayat_core::{Scene, SceneId, SceneStatus, SceneStatusKind, StoryAnalysis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Submission counter. Each story submission gets a strictly larger epoch.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(transparent)]
pub struct Epoch(u64);

impl Epoch {
    /// Numeric value; zero before the first submission.
    pub fn get(&self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Claim to write the result of one render attempt.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct RenderTicket {
    /// Submission the attempt belongs to
    epoch: Epoch,
    /// Scene being drawn
    id: SceneId,
    /// Attempt number on that scene
    attempt: u32,
    /// Visual prompt captured when the attempt started
    prompt: String,
}

/// What happened to a render's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RenderOutcome {
    /// Result written; the scene is now in this state
    #[display("applied ({})", _0)]
    Applied(SceneStatusKind),
    /// A newer submission or a newer attempt owns the scene; result dropped
    #[display("discarded")]
    Discarded,
    /// No scene with that id in the current submission; nothing started
    #[display("skipped")]
    Skipped,
}

/// Observable storyboard state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneBoard {
    epoch: Epoch,
    analyzing: bool,
    general_error: Option<String>,
    scenes: BTreeMap<SceneId, Scene>,
}

impl SceneBoard {
    /// Current submission.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// True while the current story is being analyzed.
    pub fn analyzing(&self) -> bool {
        self.analyzing
    }

    /// Story-level error shown in place of scenes.
    pub fn general_error(&self) -> Option<&str> {
        self.general_error.as_deref()
    }

    /// Scenes in narrative order.
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.values()
    }

    /// Scene by id.
    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.get(&id)
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// True when there are no scenes.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Number of scenes in `kind`.
    pub fn count(&self, kind: SceneStatusKind) -> usize {
        self.scenes().filter(|s| s.status_kind() == kind).count()
    }

    /// Ids of failed scenes, in order.
    pub fn failed_ids(&self) -> Vec<SceneId> {
        self.scenes()
            .filter(|s| s.status_kind() == SceneStatusKind::Failed)
            .map(|s| *s.id())
            .collect()
    }

    /// Nothing in flight: analysis done and no scene pending.
    pub fn is_settled(&self) -> bool {
        !self.analyzing && self.count(SceneStatusKind::Pending) == 0
    }

    /// Start a new submission, dropping everything from the previous one.
    pub(crate) fn begin_submission(&mut self) -> Epoch {
        self.epoch = self.epoch.next();
        self.analyzing = true;
        self.general_error = None;
        self.scenes.clear();
        self.epoch
    }

    /// Record that analysis of `epoch` failed. False if superseded.
    pub(crate) fn fail_analysis(&mut self, epoch: Epoch) -> bool {
        if epoch != self.epoch {
            return false;
        }
        self.analyzing = false;
        self.general_error = Some(ANALYSIS_FAILED.to_string());
        self.scenes.clear();
        true
    }

    /// End analysis of `epoch` without a result: no scenes, no general error.
    ///
    /// False if superseded or no longer analyzing.
    pub(crate) fn abandon_analysis(&mut self, epoch: Epoch) -> bool {
        if epoch != self.epoch || !self.analyzing {
            return false;
        }
        self.analyzing = false;
        true
    }

    /// Replace the scene set with the analysis of `epoch` and open the first
    /// render attempt on every scene.
    ///
    /// Returns `None` (and changes nothing) if `epoch` was superseded.
    pub(crate) fn install_scenes(
        &mut self,
        epoch: Epoch,
        analysis: StoryAnalysis,
    ) -> Option<Vec<RenderTicket>> {
        if epoch != self.epoch {
            return None;
        }

        self.scenes = analysis
            .scenes
            .into_iter()
            .enumerate()
            .map(|(index, outline)| {
                let id = SceneId::from_index(index);
                (id, Scene::from_outline(id, outline))
            })
            .collect();
        self.analyzing = false;

        let ids: Vec<SceneId> = self.scenes.keys().copied().collect();
        Some(ids.into_iter().filter_map(|id| self.begin_render(id)).collect())
    }

    /// Open a new render attempt on `id`: back to pending, attempt bumped.
    ///
    /// `None` if the current submission has no such scene.
    pub(crate) fn begin_render(&mut self, id: SceneId) -> Option<RenderTicket> {
        let scene = self.scenes.get_mut(&id)?;
        let attempt = scene.begin_attempt();
        Some(RenderTicket {
            epoch: self.epoch,
            id,
            attempt,
            prompt: scene.visual_prompt().clone(),
        })
    }

    /// Write a render result if `ticket` is still the latest attempt of the
    /// current submission on that scene.
    pub(crate) fn resolve(&mut self, ticket: &RenderTicket, status: SceneStatus) -> RenderOutcome {
        if ticket.epoch != self.epoch {
            return RenderOutcome::Discarded;
        }
        let Some(scene) = self.scenes.get_mut(&ticket.id) else {
            return RenderOutcome::Discarded;
        };
        if *scene.attempt() != ticket.attempt {
            return RenderOutcome::Discarded;
        }

        match status {
            SceneStatus::Ready(artifact) => scene.mark_ready(artifact),
            SceneStatus::Failed(note) => scene.mark_failed(note),
            SceneStatus::Pending => return RenderOutcome::Discarded,
        }
        RenderOutcome::Applied(scene.status_kind())
    }
}
