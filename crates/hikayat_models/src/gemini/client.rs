//! Google Gemini REST client.
//!
//! One [`GeminiClient`] serves both the analysis model and the image model.
//! Each model gets its own [`RateLimiter`], created lazily on first use with
//! the tier's model-specific overrides applied, so a busy image model never
//! throttles analysis.
//!
//! # Example
//!
//! ```no_run
//! use hikayat_models::{GeminiClient, GenerateContentRequest};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new_with_config(Some("payasyougo"))?;
//! let request = GenerateContentRequest::user_text("Say hello");
//! let response = client.generate_content("gemini-2.5-flash", &request, 100).await?;
//! println!("{:?}", response.text());
//! # Ok(())
//! # }
//! ```

use super::protocol::{ApiErrorBody, GenerateContentRequest, GenerateContentResponse};
use crate::{LlmMetrics, classify_error};
use hikayat_error::{
    GeminiError, GeminiErrorKind, HikayatError, HikayatResult, RateLimitError, RateLimitErrorKind,
};
use hikayat_rate_limit::{HikayatConfig, ModelSettings, RateLimiter, RetrySettings, TierConfig};
use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

const PROVIDER: &str = "gemini";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Client for the Gemini `generateContent` endpoint with per-model rate limiting.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    settings: ModelSettings,
    retry: RetrySettings,
    base_tier: TierConfig,
    limiters: Arc<Mutex<HashMap<String, RateLimiter<TierConfig>>>>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let limiter_count = self
            .limiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("GeminiClient")
            .field("analysis_model", &self.settings.analysis)
            .field("image_model", &self.settings.image)
            .field("base_url", &self.settings.base_url)
            .field("tier", &self.base_tier.name)
            .field("cached_limiters", &limiter_count)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Client using the layered configuration and the provider's default tier.
    ///
    /// Reads the API key from `GEMINI_API_KEY`.
    #[instrument(name = "gemini_client_new")]
    pub fn new() -> HikayatResult<Self> {
        Self::new_with_config(None)
    }

    /// Client using the layered configuration and the named tier.
    ///
    /// # Errors
    ///
    /// Fails if the configuration cannot be loaded, the tier is unknown, or
    /// the API key is missing.
    #[instrument(name = "gemini_client_new_with_config")]
    pub fn new_with_config(tier_name: Option<&str>) -> HikayatResult<Self> {
        let config = HikayatConfig::load()?;
        Self::from_config(&config, tier_name)
    }

    /// Client from an already loaded configuration, key from the environment.
    pub fn from_config(config: &HikayatConfig, tier_name: Option<&str>) -> HikayatResult<Self> {
        let api_key = env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GeminiError::new(GeminiErrorKind::MissingApiKey))?;

        Self::with_api_key(api_key, config, tier_name)
    }

    /// Client with an explicit API key.
    ///
    /// An unnamed tier falls back to the provider default, then to built-in
    /// free-tier limits when the configuration has no Gemini provider.
    #[instrument(name = "gemini_client_with_api_key", skip(api_key, config))]
    pub fn with_api_key(
        api_key: impl Into<String>,
        config: &HikayatConfig,
        tier_name: Option<&str>,
    ) -> HikayatResult<Self> {
        let base_tier = match (config.get_tier(PROVIDER, tier_name), tier_name) {
            (Some(tier), _) => tier,
            (None, Some(name)) => {
                return Err(RateLimitError::new(RateLimitErrorKind::InvalidTier(
                    name.to_string(),
                ))
                .into());
            }
            (None, None) => {
                debug!("No Gemini tier configured, using built-in free tier");
                TierConfig::default()
            }
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.models.request_timeout_secs))
            .build()
            .map_err(|e| GeminiError::new(GeminiErrorKind::ClientCreation(e.to_string())))?;

        debug!(
            tier = %base_tier.name,
            analysis_model = %config.models.analysis,
            image_model = %config.models.image,
            retry = config.retry.enabled,
            "Created Gemini client"
        );

        Ok(Self {
            http,
            api_key: api_key.into(),
            settings: config.models.clone(),
            retry: config.retry,
            base_tier,
            limiters: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Model selection and request shape in use.
    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Tier the per-model limiters derive from.
    pub fn tier(&self) -> &TierConfig {
        &self.base_tier
    }

    /// Rough token estimate used for TPM accounting (four bytes per token).
    pub(crate) fn estimate_tokens(text: &str) -> u64 {
        (text.len() / 4).max(1) as u64
    }

    /// Rate limiter for `model`, created on first use.
    fn limiter_for(&self, model: &str) -> RateLimiter<TierConfig> {
        let mut limiters = self.limiters.lock().unwrap_or_else(PoisonError::into_inner);
        limiters
            .entry(model.to_string())
            .or_insert_with(|| {
                RateLimiter::new_with_retry(self.base_tier.for_model(model), self.retry)
            })
            .clone()
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            model
        )
    }

    /// One HTTP round trip, no rate limiting.
    async fn send(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GeminiError::new(GeminiErrorKind::ApiRequest(e.to_string())))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or(body);
            return Err(GeminiError::new(GeminiErrorKind::HttpError {
                status_code: status.as_u16(),
                message,
            }));
        }

        serde_json::from_str(&body)
            .map_err(|e| GeminiError::new(GeminiErrorKind::InvalidResponse(e.to_string())))
    }

    /// Call `generateContent` on `model` under that model's rate limits.
    ///
    /// `estimated_tokens` is charged against the tier's TPM quota.
    #[instrument(skip(self, request), fields(model = %model))]
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        estimated_tokens: u64,
    ) -> HikayatResult<GenerateContentResponse> {
        let limiter = self.limiter_for(model);
        let metrics = LlmMetrics::get();
        let started = Instant::now();

        let result = limiter
            .execute(estimated_tokens, || self.send(model, request))
            .await;

        match &result {
            Ok(response) => {
                metrics.record_request(PROVIDER, model, started.elapsed().as_secs_f64());
                if let Some(usage) = response.usage_metadata {
                    metrics.record_tokens(
                        model,
                        usage.prompt_token_count,
                        usage.candidates_token_count,
                    );
                }
                debug!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    candidates = response.candidates.len(),
                    "Gemini call succeeded"
                );
            }
            Err(e) => {
                metrics.record_error(PROVIDER, model, classify_error(e));
                warn!(error = %e, "Gemini call failed");
            }
        }

        result
    }

    /// Record a failure detected after a successful HTTP exchange.
    pub(crate) fn record_failure(&self, model: &str, error: &HikayatError) {
        LlmMetrics::get().record_error(PROVIDER, model, classify_error(error));
    }
}
