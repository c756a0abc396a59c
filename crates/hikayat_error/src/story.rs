//! Story input and analysis error types.

/// Specific error conditions for story submission and analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StoryErrorKind {
    /// Story text was empty or whitespace only
    #[display("Story text is empty")]
    EmptyStory,
    /// Analyzer response carried no text part
    #[display("Analysis response contained no text")]
    MissingText,
    /// Analyzer response text was not the expected JSON
    #[display("Malformed analysis: {}", _0)]
    MalformedAnalysis(String),
    /// Analyzer returned zero scenes
    #[display("Analysis produced no scenes")]
    NoScenes,
}

/// Error type for story operations.
///
/// # Examples
///
/// ```
/// use hikayat_error::{StoryError, StoryErrorKind};
///
/// let err = StoryError::new(StoryErrorKind::NoScenes);
/// assert!(format!("{}", err).contains("no scenes"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Story Error: {} at line {} in {}", kind, line, file)]
pub struct StoryError {
    /// The specific error condition
    pub kind: StoryErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl StoryError {
    /// Create a new StoryError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
