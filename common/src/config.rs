use config::{Config, ConfigError};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub log: LogConfig,
    /// Connection used by the `report` subcommand; the HTTP API takes it per request.
    pub looker: Option<LookerConfig>,
}

/// Connection settings for one Looker instance.
#[derive(Debug, Deserialize, Clone)]
pub struct LookerConfig {
    pub host_url: String,
    pub port: u16,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LogConfig {
    #[serde(default)]
    pub json: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            jitter: default_jitter(),
        }
    }
}

fn default_api_port() -> u16 {
    3000
}

fn default_page_size() -> usize {
    100
}

fn default_concurrency() -> usize {
    16
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_jitter() -> bool {
    true
}

impl Settings {
    /// Loads settings from an optional TOML file layered with `APP__*` environment variables.
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;

        debug!(
            api_port = settings.api_port,
            page_size = settings.fetch.page_size,
            concurrency = settings.fetch.concurrency,
            max_attempts = settings.retry.max_attempts,
            has_looker = settings.looker.is_some(),
            "Parsed settings"
        );

        Ok(settings)
    }
}
