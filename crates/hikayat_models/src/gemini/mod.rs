//! Google Gemini provider.
//!
//! - [`GeminiClient`] - REST client with per-model rate limiting
//! - `analyzer` - [`StoryAnalyzer`](hikayat_interface::StoryAnalyzer) on the text model
//! - `renderer` - [`ImageRenderer`](hikayat_interface::ImageRenderer) on the image model
//! - `protocol` - `generateContent` wire types

mod analyzer;
mod client;
mod prompts;
mod protocol;
mod renderer;

pub use analyzer::parse_analysis;
pub use client::{API_KEY_VAR, GeminiClient};
pub use prompts::{
    STYLE_SUFFIX, analysis_prompt, analysis_request, analysis_schema, image_request, render_prompt,
};
pub use protocol::{
    ApiErrorBody, ApiErrorDetail, Candidate, Content, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, ImageConfig, InlineData, Part, UsageMetadata,
};
pub use renderer::extract_image;
