//! Configuration types for repo-scout

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, time::Duration};

/// Main configuration
///
/// Fields are organized into logical sub-configs:
/// - [`github`](GitHubConfig): upstream endpoint, defaults, fan-out ceiling
/// - [`retry`](RetryConfig): backoff policy for transient upstream failures
/// - [`rate_limit`](RateLimitConfig): admission gate in front of the fetcher
/// - [`api`](ApiConfig): HTTP front end
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream search API settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Retry policy for upstream calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Admission gate settings
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// Missing fields take their defaults. The loaded config is validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that would make the pipeline misbehave at runtime
    pub fn validate(&self) -> Result<()> {
        fn invalid(key: &str, message: &str) -> Error {
            Error::Config {
                message: message.to_string(),
                key: Some(key.to_string()),
            }
        }

        if url::Url::parse(&self.github.base_url).is_err() {
            return Err(invalid(
                "github.base_url",
                "base URL must be an absolute URL",
            ));
        }
        if self.github.default_page == 0 {
            return Err(invalid("github.default_page", "default page must be at least 1"));
        }
        if self.github.default_per_page == 0 {
            return Err(invalid(
                "github.default_per_page",
                "default per-page must be at least 1",
            ));
        }
        if self.github.max_fan_out_pages == 0 {
            return Err(invalid(
                "github.max_fan_out_pages",
                "fan-out page ceiling must be at least 1",
            ));
        }
        if !self.retry.backoff_multiplier.is_finite() || self.retry.backoff_multiplier < 1.0 {
            return Err(invalid(
                "retry.backoff_multiplier",
                "backoff multiplier must be a finite number of at least 1.0",
            ));
        }
        if self.rate_limit.enabled && self.rate_limit.limit_for_period == 0 {
            return Err(invalid(
                "rate_limit.limit_for_period",
                "rate limit capacity must be at least 1",
            ));
        }
        if self.rate_limit.enabled && self.rate_limit.refresh_period.is_zero() {
            return Err(invalid(
                "rate_limit.refresh_period",
                "refresh period must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Upstream search API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// API base URL without trailing slash (default: "https://api.github.com")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request (None = anonymous)
    #[serde(default)]
    pub token: Option<String>,

    /// Query used when the caller supplies no filter (default: "stars:>1")
    #[serde(default = "default_query")]
    pub default_query: String,

    /// Page used when the caller supplies none (default: 1)
    #[serde(default = "default_page")]
    pub default_page: u32,

    /// Items per upstream page (default: 30)
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,

    /// Highest page requested when fanning out (default: 9)
    ///
    /// The search API stops serving results after its maximum-results-per-query
    /// limit; this ceiling keeps fan-out within it.
    #[serde(default = "default_max_fan_out_pages")]
    pub max_fan_out_pages: u32,

    /// Timeout for a single upstream call (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Largest upstream body accepted (default: 16 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            default_query: default_query(),
            default_page: default_page(),
            default_per_page: default_per_page(),
            max_fan_out_pages: default_max_fan_out_pages(),
            request_timeout: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Retry configuration for transient failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 2 seconds)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Admission gate configuration
///
/// The gate hands out `limit_for_period` permits, refilled continuously so
/// that a full bucket is restored every `refresh_period`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable the admission gate (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Bucket capacity (default: 10)
    #[serde(default = "default_limit_for_period")]
    pub limit_for_period: u32,

    /// Time to refill an empty bucket (default: 1 second)
    #[serde(default = "default_refresh_period", with = "duration_serde")]
    pub refresh_period: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            limit_for_period: default_limit_for_period(),
            refresh_period: default_refresh_period(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8080)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "https://api.github.com".into()
}

fn default_query() -> String {
    "stars:>1".into()
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    30
}

fn default_max_fan_out_pages() -> u32 {
    9
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_limit_for_period() -> u32 {
    10
}

fn default_refresh_period() -> Duration {
    Duration::from_secs(1)
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
