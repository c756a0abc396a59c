//! Analyzer output.

use crate::SceneOutline;
use serde::{Deserialize, Serialize};

/// Ordered scene outlines returned by a story analyzer.
///
/// The JSON shape matches the response schema sent to the analysis model:
///
/// ```
/// use hikayat_core::StoryAnalysis;
///
/// let json = r#"{"scenes": [{
///     "narrative_segment": "كان يا مكان",
///     "visual_prompt": "A boy in a red djellaba",
///     "characters": "Karim, 7 years old"
/// }]}"#;
///
/// let analysis: StoryAnalysis = serde_json::from_str(json).unwrap();
/// assert_eq!(analysis.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoryAnalysis {
    /// Scenes in narrative order
    #[serde(default)]
    pub scenes: Vec<SceneOutline>,
}

impl StoryAnalysis {
    /// Create an analysis from scene outlines.
    pub fn new(scenes: Vec<SceneOutline>) -> Self {
        Self { scenes }
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// True when the analyzer produced no scenes.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}
