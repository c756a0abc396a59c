//! Metrics for hosted-model calls.
//!
//! Instruments are created on the OpenTelemetry global meter, so they are
//! no-ops until the binary installs a meter provider.

use hikayat_error::{GeminiErrorKind, HikayatError, HikayatErrorKind};
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter},
};
use std::sync::OnceLock;

static METRICS: OnceLock<LlmMetrics> = OnceLock::new();

/// Request, error, latency and token instruments labeled by provider and model.
#[derive(Clone)]
pub struct LlmMetrics {
    /// Meter handle kept alive for metric instruments
    _meter: Meter,
    /// Total model API requests
    pub requests: Counter<u64>,
    /// Failed model API requests
    pub errors: Counter<u64>,
    /// Model API call duration in seconds
    pub duration: Histogram<f64>,
    /// Prompt tokens reported by the provider
    pub prompt_tokens: Counter<u64>,
    /// Output tokens reported by the provider
    pub completion_tokens: Counter<u64>,
}

impl LlmMetrics {
    fn init() -> Self {
        let meter = global::meter("hikayat_llm");

        Self {
            _meter: meter.clone(),
            requests: meter
                .u64_counter("llm.requests")
                .with_description("Total model API requests")
                .build(),
            errors: meter
                .u64_counter("llm.errors")
                .with_description("Failed model API requests")
                .build(),
            duration: meter
                .f64_histogram("llm.duration")
                .with_unit("seconds")
                .with_description("Model API call duration")
                .build(),
            prompt_tokens: meter
                .u64_counter("llm.tokens.prompt")
                .with_description("Prompt tokens used")
                .build(),
            completion_tokens: meter
                .u64_counter("llm.tokens.completion")
                .with_description("Output tokens used")
                .build(),
        }
    }

    /// Global instance.
    pub fn get() -> &'static Self {
        METRICS.get_or_init(Self::init)
    }

    /// Record a successful call.
    pub fn record_request(&self, provider: &str, model: &str, duration_secs: f64) {
        let labels = &[
            KeyValue::new("provider", provider.to_string()),
            KeyValue::new("model", model.to_string()),
        ];
        self.requests.add(1, labels);
        self.duration.record(duration_secs, labels);
    }

    /// Record a failed call.
    pub fn record_error(&self, provider: &str, model: &str, error_type: &'static str) {
        let labels = &[
            KeyValue::new("provider", provider.to_string()),
            KeyValue::new("model", model.to_string()),
            KeyValue::new("error_type", error_type),
        ];
        self.errors.add(1, labels);
    }

    /// Record provider-reported token usage.
    pub fn record_tokens(&self, model: &str, prompt_tokens: u64, completion_tokens: u64) {
        let labels = &[KeyValue::new("model", model.to_string())];
        self.prompt_tokens.add(prompt_tokens, labels);
        self.completion_tokens.add(completion_tokens, labels);
    }
}

impl Default for LlmMetrics {
    fn default() -> Self {
        Self::get().clone()
    }
}

/// Error class used as the `error_type` metric label.
///
/// One of `rate_limit`, `auth`, `timeout`, `invalid_request`, `server`,
/// `network`, `no_image`, `invalid_response`, `malformed_analysis`, `unknown`.
///
/// ```
/// use hikayat_error::{GeminiError, GeminiErrorKind, HikayatError};
/// use hikayat_models::classify_error;
///
/// let err = HikayatError::from(GeminiError::new(GeminiErrorKind::HttpError {
///     status_code: 429,
///     message: "quota".to_string(),
/// }));
/// assert_eq!(classify_error(&err), "rate_limit");
/// ```
pub fn classify_error(error: &HikayatError) -> &'static str {
    match error.kind() {
        HikayatErrorKind::Gemini(e) => match &e.kind {
            GeminiErrorKind::HttpError { status_code, .. } => match *status_code {
                429 => "rate_limit",
                401 | 403 => "auth",
                408 => "timeout",
                400..=499 => "invalid_request",
                500..=599 => "server",
                _ => "unknown",
            },
            GeminiErrorKind::ApiRequest(_) => "network",
            GeminiErrorKind::MissingApiKey => "auth",
            GeminiErrorKind::NoImageData(_) => "no_image",
            GeminiErrorKind::InvalidResponse(_) | GeminiErrorKind::Base64Decode(_) => {
                "invalid_response"
            }
            GeminiErrorKind::ClientCreation(_) => "unknown",
        },
        HikayatErrorKind::RateLimit(_) => "rate_limit",
        HikayatErrorKind::Story(_) | HikayatErrorKind::Json(_) => "malformed_analysis",
        _ => "unknown",
    }
}
