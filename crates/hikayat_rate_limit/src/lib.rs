//! Rate limiting, retry and configuration.
//!
//! This crate keeps requests to the hosted models within provider quotas and
//! loads the layered `hikayat.toml` configuration:
//! - `Tier` / `TierConfig` describe RPM, TPM, RPD and concurrency limits
//! - `RateLimiter` enforces them with governor and a Tokio semaphore, with
//!   optional exponential-backoff retry for transient errors
//! - `HikayatConfig` merges bundled defaults with user overrides

mod config;
mod limiter;
mod tier;

pub use config::{
    HikayatConfig, ModelSettings, ModelTierConfig, ProviderConfig, RetrySettings,
    StoryboardSettings, TierConfig,
};
pub use hikayat_error::{RateLimitError, RateLimitErrorKind};
pub use limiter::{RateLimiter, RateLimiterGuard};
pub use tier::Tier;
