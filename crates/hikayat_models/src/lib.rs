//! Hosted-model integrations for Hikayat.
//!
//! The Gemini provider (feature `gemini`, on by default) implements both
//! collaborator traits on a single [`GeminiClient`]:
//! - [`StoryAnalyzer`](hikayat_interface::StoryAnalyzer) splits a story into scenes
//!   with a JSON-schema constrained text model
//! - [`ImageRenderer`](hikayat_interface::ImageRenderer) draws one scene with an
//!   image model
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "gemini")]
//! # {
//! use hikayat_core::StoryText;
//! use hikayat_interface::StoryAnalyzer;
//! use hikayat_models::GeminiClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new()?;
//! let story = StoryText::new("كان يا ما كان، في مدينة فاس القديمة...")?;
//! let analysis = client.analyze(&story).await?;
//! println!("{} scenes", analysis.len());
//! # Ok(())
//! # }
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod extraction;
mod metrics;

pub use extraction::extract_json;
pub use metrics::{LlmMetrics, classify_error};

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{
    API_KEY_VAR, ApiErrorBody, ApiErrorDetail, Candidate, Content, GeminiClient,
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig, InlineData,
    Part, STYLE_SUFFIX, UsageMetadata, analysis_prompt, analysis_request, analysis_schema,
    extract_image, image_request, parse_analysis, render_prompt,
};
