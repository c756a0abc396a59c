//! Story analysis on the Gemini text model.

use super::client::GeminiClient;
use super::prompts::{analysis_prompt, analysis_request};
use super::protocol::GenerateContentResponse;
use crate::extract_json;
use async_trait::async_trait;
use hikayat_core::{StoryAnalysis, StoryText};
use hikayat_error::{HikayatResult, StoryError, StoryErrorKind};
use hikayat_interface::StoryAnalyzer;
use tracing::{debug, instrument, warn};

/// Output budget reserved for the scene list when charging TPM.
const ANALYSIS_OUTPUT_TOKENS: u64 = 2_048;

/// Scene count the prompt asks for.
const EXPECTED_SCENES: std::ops::RangeInclusive<usize> = 3..=6;

/// Turn an analysis response into scene outlines.
///
/// Missing text, text that is not the expected JSON, and an empty scene list
/// are all errors; a partial result is never returned.
///
/// # Examples
///
/// ```
/// use hikayat_models::{GenerateContentResponse, parse_analysis};
///
/// let body = r#"{"candidates": [{"content": {"parts": [{"text":
///     "{\"scenes\": [{\"narrative_segment\": \"نام القط\", \"visual_prompt\": \"A sleeping cat\", \"characters\": \"grey cat\"}]}"
/// }]}}]}"#;
/// let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
///
/// let analysis = parse_analysis(&response).unwrap();
/// assert_eq!(analysis.len(), 1);
/// assert_eq!(analysis.scenes[0].characters, "grey cat");
/// ```
pub fn parse_analysis(response: &GenerateContentResponse) -> HikayatResult<StoryAnalysis> {
    let text = response
        .text()
        .ok_or_else(|| StoryError::new(StoryErrorKind::MissingText))?;

    let json = extract_json(&text)?;
    let analysis: StoryAnalysis = serde_json::from_str(&json).map_err(|e| {
        StoryError::new(StoryErrorKind::MalformedAnalysis(e.to_string()))
    })?;

    if analysis.is_empty() {
        return Err(StoryError::new(StoryErrorKind::NoScenes).into());
    }

    if !EXPECTED_SCENES.contains(&analysis.len()) {
        warn!(
            scenes = analysis.len(),
            "Analysis scene count outside the requested range, keeping it"
        );
    }

    Ok(analysis)
}

#[async_trait]
impl StoryAnalyzer for GeminiClient {
    #[instrument(skip(self, story), fields(model = %self.settings().analysis, chars = story.char_count()))]
    async fn analyze(&self, story: &StoryText) -> HikayatResult<StoryAnalysis> {
        let model = &self.settings().analysis;
        let request = analysis_request(story);
        let estimate = Self::estimate_tokens(&analysis_prompt(story)) + ANALYSIS_OUTPUT_TOKENS;

        let response = self.generate_content(model, &request, estimate).await?;

        let analysis = parse_analysis(&response).inspect_err(|e| {
            self.record_failure(model, e);
        })?;

        debug!(scenes = analysis.len(), "Story analyzed");
        Ok(analysis)
    }

    fn model_name(&self) -> &str {
        &self.settings().analysis
    }
}
