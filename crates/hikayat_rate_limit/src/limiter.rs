//! Rate limiter built on governor and a Tokio semaphore.
//!
//! Quotas are enforced with GCRA cells:
//! - RPM and RPD consume one cell per request
//! - TPM consumes one cell per estimated token
//! - concurrency is capped by an owned semaphore permit held for the call

use crate::{RetrySettings, Tier};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use hikayat_error::{
    HikayatError, HikayatResult, RateLimitError, RateLimitErrorKind, RetryableError,
};
use std::fmt::Display;
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const SECONDS_PER_DAY: u64 = 86_400;

/// Rate limiter enforcing every quota a [`Tier`] declares.
///
/// Limits reported as `None` by the tier are not enforced.
///
/// # Example
///
/// ```
/// use hikayat_rate_limit::{RateLimiter, TierConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let limiter = RateLimiter::new(TierConfig::default());
/// let guard = limiter.acquire(1_000).await?;
/// assert_eq!(limiter.inner().name, "Free");
/// drop(guard);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RateLimiter<T: Tier> {
    inner: T,
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
    tpm_limiter: Option<Arc<DirectRateLimiter>>,
    tpm_capacity: Option<NonZeroU32>,
    rpd_limiter: Option<Arc<DirectRateLimiter>>,
    concurrent_semaphore: Arc<Semaphore>,
    retry: RetrySettings,
}

impl<T: Tier> RateLimiter<T> {
    /// Create a limiter from a tier, with transport retry disabled.
    pub fn new(tier: T) -> Self {
        Self::new_with_retry(tier, RetrySettings::default())
    }

    /// Create a limiter from a tier and a retry policy.
    pub fn new_with_retry(tier: T, retry: RetrySettings) -> Self {
        let rpm_limiter = tier
            .rpm()
            .and_then(NonZeroU32::new)
            .map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))));

        // Governor cells are u32; larger TPM budgets saturate.
        let tpm_capacity = tier
            .tpm()
            .and_then(|tpm| NonZeroU32::new(tpm.min(u64::from(u32::MAX)) as u32));
        let tpm_limiter =
            tpm_capacity.map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))));

        // Full daily allowance is available as a burst, replenished evenly over 24h.
        let rpd_limiter = tier.rpd().and_then(NonZeroU32::new).and_then(|n| {
            let period = Duration::from_secs(SECONDS_PER_DAY) / n.get();
            Quota::with_period(period)
                .map(|quota| Arc::new(GovernorRateLimiter::direct(quota.allow_burst(n))))
        });

        let permits = tier
            .max_concurrent()
            .map(|n| n as usize)
            .unwrap_or(Semaphore::MAX_PERMITS);

        debug!(
            tier = tier.name(),
            rpm = ?tier.rpm(),
            tpm = ?tier.tpm(),
            rpd = ?tier.rpd(),
            max_concurrent = ?tier.max_concurrent(),
            retry = retry.enabled,
            "Created rate limiter"
        );

        Self {
            inner: tier,
            rpm_limiter,
            tpm_limiter,
            tpm_capacity,
            rpd_limiter,
            concurrent_semaphore: Arc::new(Semaphore::new(permits)),
            retry,
        }
    }

    /// The tier this limiter was built from.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Retry policy applied by [`execute`](Self::execute).
    pub fn retry_settings(&self) -> RetrySettings {
        self.retry
    }

    /// Clamp a token estimate to the TPM burst capacity.
    fn token_cells(&self, estimated_tokens: u64) -> Option<NonZeroU32> {
        let capacity = self.tpm_capacity?;
        let tokens = estimated_tokens.clamp(1, u64::from(capacity.get())) as u32;
        NonZeroU32::new(tokens)
    }

    /// Wait until every quota admits one request of `estimated_tokens`.
    ///
    /// The returned guard holds a concurrency slot until dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitErrorKind::Closed`] if the concurrency limiter was
    /// shut down while waiting.
    pub async fn acquire(&self, estimated_tokens: u64) -> Result<RateLimiterGuard, RateLimitError> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }

        if let (Some(limiter), Some(cells)) =
            (&self.tpm_limiter, self.token_cells(estimated_tokens))
        {
            limiter.until_n_ready(cells).await.map_err(|e| {
                RateLimitError::new(RateLimitErrorKind::InsufficientCapacity {
                    requested: cells.get(),
                    capacity: e.0,
                })
            })?;
        }

        if let Some(limiter) = &self.rpd_limiter {
            limiter.until_ready().await;
        }

        // Concurrency slot last, so a queued request does not hold it while throttled.
        let permit = self
            .concurrent_semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| RateLimitError::new(RateLimitErrorKind::Closed))?;

        Ok(RateLimiterGuard { _permit: permit })
    }

    /// Acquire without waiting; `None` if any quota would block.
    pub fn try_acquire(&self, estimated_tokens: u64) -> Option<RateLimiterGuard> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.check().ok()?;
        }

        if let (Some(limiter), Some(cells)) =
            (&self.tpm_limiter, self.token_cells(estimated_tokens))
        {
            limiter.check_n(cells).ok()?.ok()?;
        }

        if let Some(limiter) = &self.rpd_limiter {
            limiter.check().ok()?;
        }

        let permit = self.concurrent_semaphore.clone().try_acquire_owned().ok()?;
        Some(RateLimiterGuard { _permit: permit })
    }

    /// Run `operation` under the rate limits.
    ///
    /// With retry disabled (the default) the operation runs once and its error
    /// is returned as-is. With retry enabled, transient errors are retried with
    /// jittered exponential backoff whose parameters come from the first
    /// error's [`RetryableError::retry_strategy_params`], unless overridden by
    /// [`RetrySettings`]. Quotas are re-acquired before every attempt.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let image = limiter
    ///     .execute(1_000, || async { client.generate_content(model, &request).await })
    ///     .await?;
    /// ```
    pub async fn execute<F, Fut, R, E>(&self, estimated_tokens: u64, operation: F) -> HikayatResult<R>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: RetryableError + Display + Into<HikayatError>,
    {
        let first = {
            let _guard = self.acquire(estimated_tokens).await?;
            operation().await
        };

        let err = match first {
            Ok(value) => return Ok(value),
            Err(e) if !self.retry.enabled || !e.is_retryable() => return Err(e.into()),
            Err(e) => e,
        };

        let (default_backoff_ms, default_retries, max_delay_secs) = err.retry_strategy_params();
        let initial_backoff_ms = self.retry.initial_backoff_ms.unwrap_or(default_backoff_ms);
        let max_retries = self.retry.max_retries.unwrap_or(default_retries);

        warn!(
            error = %err,
            initial_backoff_ms,
            max_retries,
            max_delay_secs,
            "Transient error, retrying"
        );

        let mut delays = ExponentialBackoff::from_millis(initial_backoff_ms)
            .factor(2)
            .max_delay(Duration::from_secs(max_delay_secs))
            .map(jitter)
            .take(max_retries);

        // The first attempt already ran; back off before handing over to Retry.
        let Some(first_delay) = delays.next() else {
            return Err(err.into());
        };
        tokio::time::sleep(first_delay).await;

        let operation = &operation;
        Retry::spawn(delays, move || async move {
            let _guard = self
                .acquire(estimated_tokens)
                .await
                .map_err(|e| RetryError::Permanent(HikayatError::from(e)))?;

            match operation().await {
                Ok(value) => Ok(value),
                Err(e) if e.is_retryable() => {
                    warn!(error = %e, "Transient error, will retry");
                    Err(RetryError::Transient {
                        err: e.into(),
                        retry_after: None,
                    })
                }
                Err(e) => {
                    warn!(error = %e, "Permanent error, failing immediately");
                    Err(RetryError::Permanent(e.into()))
                }
            }
        })
        .await
    }
}

/// Holds a concurrency slot; released on drop.
pub struct RateLimiterGuard {
    _permit: OwnedSemaphorePermit,
}
