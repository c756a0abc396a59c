//! Trait definitions for the remote collaborators of the storyboard.
//!
//! The orchestrator only talks to these traits, so any provider (or a test
//! double) can stand in for the hosted models.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{ImageRenderer, StoryAnalyzer};
