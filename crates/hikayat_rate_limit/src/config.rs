//! Configuration structures.
//!
//! This module provides TOML-based configuration. The configuration system supports:
//! - Bundled defaults (include_str! from hikayat.toml)
//! - User overrides (~/.config/hikayat/hikayat.toml, then ./hikayat.toml)
//! - Automatic merging with user values taking precedence

use crate::Tier;
use config::{Config, File, FileFormat};
use hikayat_error::{ConfigError, HikayatError, HikayatResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Model-specific rate limit overrides.
///
/// Only specified fields override the tier defaults.
///
/// ```toml
/// [providers.gemini.tiers.free.models."gemini-3-pro-image-preview"]
/// rpm = 5
/// rpd = 100
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct ModelTierConfig {
    /// Requests per minute limit (overrides tier default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpm: Option<u32>,

    /// Tokens per minute limit (overrides tier default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tpm: Option<u64>,

    /// Requests per day limit (overrides tier default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpd: Option<u32>,

    /// Maximum concurrent requests (overrides tier default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<u32>,
}

/// Configuration for a specific API tier.
///
/// ```toml
/// [providers.gemini.tiers.free]
/// name = "Free"
/// rpm = 10
/// tpm = 250_000
/// rpd = 250
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TierConfig {
    /// Name of the tier (e.g., "Free", "Pay-as-you-go")
    pub name: String,

    /// Requests per minute limit (tier-level default)
    #[serde(default)]
    pub rpm: Option<u32>,

    /// Tokens per minute limit (tier-level default)
    #[serde(default)]
    pub tpm: Option<u64>,

    /// Requests per day limit (tier-level default)
    #[serde(default)]
    pub rpd: Option<u32>,

    /// Maximum concurrent requests (tier-level default)
    #[serde(default)]
    pub max_concurrent: Option<u32>,

    /// Model-specific rate limit overrides
    #[serde(default)]
    pub models: HashMap<String, ModelTierConfig>,
}

impl Default for TierConfig {
    /// Conservative free-tier limits used when no configuration is available.
    fn default() -> Self {
        Self {
            name: "Free".to_string(),
            rpm: Some(10),
            tpm: Some(250_000),
            rpd: Some(250),
            max_concurrent: None,
            models: HashMap::new(),
        }
    }
}

impl Tier for TierConfig {
    fn rpm(&self) -> Option<u32> {
        self.rpm
    }

    fn tpm(&self) -> Option<u64> {
        self.tpm
    }

    fn rpd(&self) -> Option<u32> {
        self.rpd
    }

    fn max_concurrent(&self) -> Option<u32> {
        self.max_concurrent
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TierConfig {
    /// Tier configuration with model-specific overrides applied.
    ///
    /// # Example
    ///
    /// ```
    /// use hikayat_rate_limit::{ModelTierConfig, TierConfig, Tier};
    ///
    /// let mut tier = TierConfig::default();
    /// tier.models.insert(
    ///     "gemini-3-pro-image-preview".to_string(),
    ///     ModelTierConfig { rpm: Some(2), ..Default::default() },
    /// );
    ///
    /// assert_eq!(tier.for_model("gemini-3-pro-image-preview").rpm(), Some(2));
    /// assert_eq!(tier.for_model("gemini-2.5-flash").rpm(), Some(10));
    /// ```
    pub fn for_model(&self, model_name: &str) -> TierConfig {
        match self.models.get(model_name) {
            Some(model_config) => TierConfig {
                name: self.name.clone(),
                rpm: model_config.rpm.or(self.rpm),
                tpm: model_config.tpm.or(self.tpm),
                rpd: model_config.rpd.or(self.rpd),
                max_concurrent: model_config.max_concurrent.or(self.max_concurrent),
                models: HashMap::new(),
            },
            None => self.clone(),
        }
    }
}

/// Configuration for a specific provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Name of the default tier for this provider
    pub default_tier: String,

    /// Map of tier name to tier configuration
    pub tiers: HashMap<String, TierConfig>,
}

/// Which hosted models to call and how.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Text model used to split the story into scenes
    pub analysis: String,
    /// Image model used to illustrate each scene
    pub image: String,
    /// Aspect ratio requested for every illustration
    pub image_aspect_ratio: String,
    /// Resolution tier requested for every illustration
    pub image_size: String,
    /// API root, without the `/v1beta` path
    pub base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            analysis: "gemini-2.5-flash".to_string(),
            image: "gemini-3-pro-image-preview".to_string(),
            image_aspect_ratio: "1:1".to_string(),
            image_size: "1K".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Transport-level retry for transient provider errors.
///
/// Disabled by default: a failed scene is recovered by an explicit retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RetrySettings {
    /// Retry transient errors (408, 429, 5xx, dropped connections)
    pub enabled: bool,
    /// Override for the error-specific retry count
    pub max_retries: Option<usize>,
    /// Override for the error-specific initial backoff
    pub initial_backoff_ms: Option<u64>,
}

/// Orchestrator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StoryboardSettings {
    /// Cap on simultaneous render calls; unbounded when absent
    pub max_concurrent_renders: Option<usize>,
}

/// Top-level Hikayat configuration.
///
/// # Example
///
/// ```no_run
/// use hikayat_rate_limit::HikayatConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = HikayatConfig::load()?;
/// let tier = config.get_tier("gemini", Some("free")).unwrap();
/// println!("Gemini free tier RPM: {:?}", tier.rpm);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct HikayatConfig {
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Model selection and request shape
    #[serde(default)]
    pub models: ModelSettings,

    /// Transport retry policy
    #[serde(default)]
    pub retry: RetrySettings,

    /// Orchestrator settings
    #[serde(default)]
    pub storyboard: StoryboardSettings,
}

impl HikayatConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> HikayatResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                HikayatError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                HikayatError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> HikayatResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../hikayat.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/hikayat/hikayat.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("hikayat").required(false));

        builder
            .build()
            .map_err(|e| {
                HikayatError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                HikayatError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Tier configuration for a provider, falling back to its default tier.
    #[instrument(skip(self))]
    pub fn get_tier(&self, provider: &str, tier_name: Option<&str>) -> Option<TierConfig> {
        let provider_config = self.providers.get(provider)?;

        let tier = tier_name.unwrap_or(&provider_config.default_tier);

        debug!(provider, tier, "Looking up tier configuration");

        provider_config.tiers.get(tier).cloned()
    }
}
