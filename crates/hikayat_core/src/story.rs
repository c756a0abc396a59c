//! Validated story input.

use hikayat_error::{HikayatResult, StoryError, StoryErrorKind};

/// Story text accepted for submission: trimmed and never empty.
///
/// # Examples
///
/// ```
/// use hikayat_core::StoryText;
///
/// let story = StoryText::new("  كان هناك طفل صغير اسمه كريم  ").unwrap();
/// assert_eq!(story.as_str(), "كان هناك طفل صغير اسمه كريم");
///
/// assert!(StoryText::new(" \n\t ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub struct StoryText(String);

impl StoryText {
    /// Trim and validate story text.
    #[track_caller]
    pub fn new(text: impl AsRef<str>) -> HikayatResult<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(StoryError::new(StoryErrorKind::EmptyStory).into());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The story text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters (not bytes).
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl AsRef<str> for StoryText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
