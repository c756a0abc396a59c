//! Scene illustration on the Gemini image model.

use super::client::GeminiClient;
use super::prompts::{image_request, render_prompt};
use super::protocol::GenerateContentResponse;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hikayat_core::ImageArtifact;
use hikayat_error::{GeminiError, GeminiErrorKind, HikayatResult};
use hikayat_interface::ImageRenderer;
use tracing::{debug, instrument};

/// Output tokens an image model bills per 1K image.
const IMAGE_OUTPUT_TOKENS: u64 = 1_290;

const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Decode the first inline image of a response.
///
/// A response without inline data is an error, just like a failed request.
///
/// # Examples
///
/// ```
/// use hikayat_models::{GenerateContentResponse, extract_image};
///
/// let body = r#"{"candidates": [{"content": {"parts": [
///     {"text": "Here is your drawing"},
///     {"inlineData": {"mimeType": "image/png", "data": "iVBORw0K"}}
/// ]}}]}"#;
/// let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
///
/// let artifact = extract_image(&response, "gemini-3-pro-image-preview").unwrap();
/// assert_eq!(artifact.mime(), "image/png");
/// assert_eq!(&artifact.data()[..4], b"\x89PNG");
/// ```
pub fn extract_image(response: &GenerateContentResponse, model: &str) -> HikayatResult<ImageArtifact> {
    let inline = response
        .first_inline_data()
        .ok_or_else(|| GeminiError::new(GeminiErrorKind::NoImageData(model.to_string())))?;

    let bytes = STANDARD
        .decode(inline.data.trim())
        .map_err(|e| GeminiError::new(GeminiErrorKind::Base64Decode(e.to_string())))?;

    let mime = if inline.mime_type.is_empty() {
        DEFAULT_IMAGE_MIME
    } else {
        inline.mime_type.as_str()
    };

    Ok(ImageArtifact::new(mime, bytes))
}

#[async_trait]
impl ImageRenderer for GeminiClient {
    #[instrument(skip(self, visual_prompt), fields(model = %self.settings().image))]
    async fn render(&self, visual_prompt: &str) -> HikayatResult<ImageArtifact> {
        let model = &self.settings().image;
        let request = image_request(visual_prompt, self.settings());
        let estimate = Self::estimate_tokens(&render_prompt(visual_prompt)) + IMAGE_OUTPUT_TOKENS;

        let response = self.generate_content(model, &request, estimate).await?;

        let artifact = extract_image(&response, model).inspect_err(|e| {
            self.record_failure(model, e);
        })?;

        debug!(bytes = artifact.len(), mime = artifact.mime(), "Scene rendered");
        Ok(artifact)
    }

    fn model_name(&self) -> &str {
        &self.settings().image
    }
}
