//! Top-level error wrapper types.

use crate::{
    ConfigError, GeminiError, HttpError, JsonError, RateLimitError, StorageError, StoryError,
};

/// Every error condition the workspace can surface.
///
/// # Examples
///
/// ```
/// use hikayat_error::{HikayatError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: HikayatError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum HikayatErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Gemini provider error
    #[from(GeminiError)]
    Gemini(GeminiError),
    /// Story validation or analysis error
    #[from(StoryError)]
    Story(StoryError),
    /// Export storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Rate limiter error
    #[from(RateLimitError)]
    RateLimit(RateLimitError),
}

/// Hikayat error with kind discrimination.
///
/// # Examples
///
/// ```
/// use hikayat_error::{ConfigError, HikayatResult};
///
/// fn might_fail() -> HikayatResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Hikayat Error: {}", _0)]
pub struct HikayatError(Box<HikayatErrorKind>);

impl HikayatError {
    /// Create a new error from a kind.
    pub fn new(kind: HikayatErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &HikayatErrorKind {
        &self.0
    }

    /// True when the underlying cause is a transient provider error.
    pub fn is_retryable(&self) -> bool {
        match self.kind() {
            HikayatErrorKind::Gemini(e) => e.kind.is_retryable(),
            _ => false,
        }
    }
}

impl<T> From<T> for HikayatError
where
    T: Into<HikayatErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Hikayat operations.
pub type HikayatResult<T> = std::result::Result<T, HikayatError>;
