//! Scene descriptors and their render status.

use crate::ImageArtifact;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Stable, 1-based scene identifier within one submission.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct SceneId(u32);

impl SceneId {
    /// Id for the scene at `index` in analyzer output.
    ///
    /// ```
    /// use hikayat_core::SceneId;
    ///
    /// assert_eq!(SceneId::from_index(0), SceneId::from(1));
    /// ```
    pub fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(1)))
    }

    /// Numeric value.
    pub fn get(&self) -> u32 {
        self.0
    }
}

/// One scene as described by the analyzer.
///
/// # Examples
///
/// ```
/// use hikayat_core::SceneOutlineBuilder;
///
/// let outline = SceneOutlineBuilder::default()
///     .narrative_segment("خرج كريم إلى السوق")
///     .visual_prompt("A boy walking through a medina souk")
///     .characters("Karim, curly black hair, red djellaba")
///     .build()
///     .unwrap();
///
/// assert!(outline.visual_prompt.contains("medina"));
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct SceneOutline {
    /// Story excerpt this panel illustrates
    pub narrative_segment: String,
    /// Instruction sent to the image renderer
    pub visual_prompt: String,
    /// Character-consistency notes
    pub characters: String,
}

/// Discriminant of [`SceneStatus`], for display and serialization.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum SceneStatusKind {
    /// Render requested or in flight
    #[display("pending")]
    Pending,
    /// Illustration available
    #[display("ready")]
    Ready,
    /// Last render attempt failed
    #[display("failed")]
    Failed,
}

/// Render status of a scene.
///
/// The artifact and the error note live inside their variants, so a scene can
/// never carry both, and a pending scene carries neither.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SceneStatus {
    /// Render requested or in flight
    #[default]
    Pending,
    /// Illustration available
    Ready(ImageArtifact),
    /// Last render attempt failed with this note
    Failed(String),
}

impl SceneStatus {
    /// Status discriminant.
    pub fn kind(&self) -> SceneStatusKind {
        match self {
            SceneStatus::Pending => SceneStatusKind::Pending,
            SceneStatus::Ready(_) => SceneStatusKind::Ready,
            SceneStatus::Failed(_) => SceneStatusKind::Failed,
        }
    }
}

/// One storyboard panel.
///
/// Text fields are fixed at creation; only the status changes, through
/// [`Scene::begin_attempt`], [`Scene::mark_ready`] and [`Scene::mark_failed`].
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Scene {
    /// Correlation key for every update
    id: SceneId,
    /// Story excerpt this panel illustrates
    narrative_segment: String,
    /// Instruction sent to the image renderer
    visual_prompt: String,
    /// Character-consistency notes
    characters: String,
    /// Current render status
    status: SceneStatus,
    /// Number of render attempts started
    attempt: u32,
}

impl Scene {
    /// Create a pending scene from analyzer output. No attempt has started yet.
    pub fn from_outline(id: SceneId, outline: SceneOutline) -> Self {
        Self {
            id,
            narrative_segment: outline.narrative_segment,
            visual_prompt: outline.visual_prompt,
            characters: outline.characters,
            status: SceneStatus::Pending,
            attempt: 0,
        }
    }

    /// Status discriminant.
    pub fn status_kind(&self) -> SceneStatusKind {
        self.status.kind()
    }

    /// Rendered illustration, present only when ready.
    pub fn image_artifact(&self) -> Option<&ImageArtifact> {
        match &self.status {
            SceneStatus::Ready(artifact) => Some(artifact),
            _ => None,
        }
    }

    /// Error note, present only when failed.
    pub fn error_note(&self) -> Option<&str> {
        match &self.status {
            SceneStatus::Failed(note) => Some(note),
            _ => None,
        }
    }

    /// Start a new render attempt: back to pending, artifact and note dropped.
    ///
    /// Returns the new attempt number.
    pub fn begin_attempt(&mut self) -> u32 {
        self.status = SceneStatus::Pending;
        self.attempt = self.attempt.saturating_add(1);
        self.attempt
    }

    /// Store a successful render, replacing any previous artifact wholesale.
    pub fn mark_ready(&mut self, artifact: ImageArtifact) {
        self.status = SceneStatus::Ready(artifact);
    }

    /// Record a failed render.
    pub fn mark_failed(&mut self, note: impl Into<String>) {
        self.status = SceneStatus::Failed(note.into());
    }
}
