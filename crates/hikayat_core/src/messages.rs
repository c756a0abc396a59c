//! Fixed user-facing messages.

/// General error shown when the story could not be analyzed.
pub const ANALYSIS_FAILED: &str =
    "عذراً، لم نتمكن من تحليل القصة. يرجى التأكد من الاتصال بالإنترنت والمحاولة مرة أخرى.";

/// Error note attached to a scene whose illustration failed.
pub const RENDER_FAILED: &str = "Failed to generate image";
