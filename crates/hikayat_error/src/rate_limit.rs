//! Error types for rate limiting operations.

/// Error kinds for rate limiting operations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum RateLimitErrorKind {
    /// Concurrency semaphore was closed while waiting for a permit.
    #[display("Concurrency limiter closed")]
    Closed,
    /// Request needs more tokens than the per-minute quota can ever grant.
    #[display("Requested {} tokens exceeds capacity of {}", requested, capacity)]
    InsufficientCapacity {
        /// Tokens requested
        requested: u32,
        /// Quota burst capacity
        capacity: u32,
    },
    /// Requested tier is not configured.
    #[display("Invalid tier: {}", _0)]
    InvalidTier(String),
}

/// Rate limiting error with location tracking.
///
/// # Examples
///
/// ```
/// use hikayat_error::{RateLimitError, RateLimitErrorKind};
///
/// let err = RateLimitError::new(RateLimitErrorKind::InvalidTier("gold".to_string()));
/// assert!(format!("{}", err).contains("gold"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Rate Limit Error: {} at line {} in {}", kind, line, file)]
pub struct RateLimitError {
    /// The kind of error that occurred
    pub kind: RateLimitErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RateLimitError {
    /// Create a new rate limiting error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RateLimitErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
