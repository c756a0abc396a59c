//! Scene orchestration for Hikayat storyboards.
//!
//! A [`Storyboard`] takes a story through two stages:
//! 1. one analyzer call splits it into scenes, all shown as pending
//! 2. one renderer call per scene, all started at once, each landing on its
//!    own scene as it completes
//!
//! A new submission supersedes the previous one at once. Results that arrive
//! late, from an older submission or an older retry of the same scene, are
//! discarded. Observers follow progress through [`Storyboard::subscribe`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod board;
mod export;
mod orchestrator;

pub use board::{Epoch, RenderOutcome, RenderTicket, SceneBoard};
pub use export::{
    MANIFEST_FILE, ManifestEntry, StoryboardManifest, export_storyboard, scene_file_name,
};
pub use orchestrator::{Storyboard, StoryboardOptions, Submission, SubmissionOutcome};
