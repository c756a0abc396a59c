//! Prompt text and request shapes for storyboard analysis and illustration.

use super::protocol::{GenerateContentRequest, GenerationConfig, ImageConfig};
use hikayat_core::StoryText;
use hikayat_rate_limit::ModelSettings;
use serde_json::json;

/// Appended to every visual prompt before it is sent to the image model.
pub const STYLE_SUFFIX: &str = ", illustration style, colored pencil drawing, visible pencil strokes, on textured paper, masterpiece, warm lighting, Moroccan atmosphere";

const ANALYSIS_INSTRUCTIONS: &str = r#"You are an expert storyboard artist for Moroccan children's books.

TASK:
Analyze the following Arabic story and break it down into 3 to 6 distinct key scenes.
For each scene, provide:
1. "narrative_segment": The specific Arabic text from the story corresponding to this scene.
2. "characters": A concise visual description of the characters present (e.g., "Ahmed, 7 years old, curly black hair, wearing a red Djellaba").
3. "visual_prompt": A highly detailed English image generation prompt.

CRITICAL STYLE GUIDELINES (Must be included in visual_prompt):
- Art Style: Hand-drawn colored pencil illustration, textured, soft shading, vibrant but natural colors, white paper background, children's book style.
- Cultural Context: MOROCCO. Use Moroccan architecture (arches, zellige tiles, riads), Moroccan clothing (Djellaba, Kaftan, Gandoura, Fez hat), and Moroccan landscapes (Atlas mountains, medina streets, palm trees).
- Consistency: Ensure character descriptions are consistent across all prompts.

STORY:
"#;

/// Full analysis prompt with the story appended verbatim.
///
/// ```
/// use hikayat_core::StoryText;
/// use hikayat_models::analysis_prompt;
///
/// let story = StoryText::new("ذهبت سلمى إلى السوق").unwrap();
/// let prompt = analysis_prompt(&story);
/// assert!(prompt.contains("3 to 6"));
/// assert!(prompt.ends_with("ذهبت سلمى إلى السوق"));
/// ```
pub fn analysis_prompt(story: &StoryText) -> String {
    format!("{}{}", ANALYSIS_INSTRUCTIONS, story.as_str())
}

/// Schema constraining analysis output to `{ scenes: [{ narrative_segment, visual_prompt, characters }] }`.
pub fn analysis_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "scenes": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "narrative_segment": { "type": "STRING" },
                        "visual_prompt": { "type": "STRING" },
                        "characters": { "type": "STRING" }
                    },
                    "required": ["narrative_segment", "visual_prompt", "characters"]
                }
            }
        },
        "required": ["scenes"]
    })
}

/// Request asking the analysis model for schema-constrained JSON.
pub fn analysis_request(story: &StoryText) -> GenerateContentRequest {
    GenerateContentRequest::user_text(analysis_prompt(story)).with_generation_config(
        GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(analysis_schema()),
            image_config: None,
        },
    )
}

/// Visual prompt with the fixed style suffix.
///
/// ```
/// use hikayat_models::{STYLE_SUFFIX, render_prompt};
///
/// let prompt = render_prompt("A girl feeding pigeons in a riad courtyard");
/// assert!(prompt.starts_with("A girl feeding pigeons"));
/// assert!(prompt.ends_with(STYLE_SUFFIX));
/// ```
pub fn render_prompt(visual_prompt: &str) -> String {
    format!("{}{}", visual_prompt, STYLE_SUFFIX)
}

/// Request for one illustration with the configured aspect ratio and size.
pub fn image_request(visual_prompt: &str, settings: &ModelSettings) -> GenerateContentRequest {
    GenerateContentRequest::user_text(render_prompt(visual_prompt)).with_generation_config(
        GenerationConfig {
            response_mime_type: None,
            response_schema: None,
            image_config: Some(ImageConfig {
                aspect_ratio: settings.image_aspect_ratio.clone(),
                image_size: settings.image_size.clone(),
            }),
        },
    )
}
