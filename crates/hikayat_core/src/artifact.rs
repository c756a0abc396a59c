//! Rendered illustration data.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;

/// One rendered image, owned by exactly one scene.
///
/// The bytes are shared behind an `Arc` so board snapshots stay cheap to clone.
///
/// # Examples
///
/// ```
/// use hikayat_core::ImageArtifact;
///
/// let artifact = ImageArtifact::new("image/png", vec![0x89, 0x50, 0x4E, 0x47]);
/// assert_eq!(artifact.data_url(), "data:image/png;base64,iVBORw==");
/// assert_eq!(artifact.file_extension(), "png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageArtifact {
    mime: String,
    data: Arc<[u8]>,
}

impl ImageArtifact {
    /// Wrap raw image bytes.
    pub fn new(mime: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            mime: mime.into(),
            data: data.into(),
        }
    }

    /// MIME type reported by the renderer.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Raw image bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-length payload.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `data:` URL suitable for direct display.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }

    /// File extension matching the MIME type.
    pub fn file_extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        }
    }
}
