//! Core data types for Hikayat storyboards.
//!
//! This crate provides the scene descriptor model shared by the analyzer,
//! the renderer and the orchestrator.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analysis;
mod artifact;
pub mod messages;
mod scene;
mod story;

pub use analysis::StoryAnalysis;
pub use artifact::ImageArtifact;
pub use scene::{
    Scene, SceneId, SceneOutline, SceneOutlineBuilder, SceneStatus, SceneStatusKind,
};
pub use story::StoryText;
