//! Run configuration.
//!
//! The defaults are embedded from `config/default.toml`. A `--config` file
//! is parsed the same way, so any section it leaves out keeps its default.

use std::path::Path;
use std::time::Duration;

use incident_log_augment::AugmentConfig;
use incident_log_extract::TemplateConfig;
use incident_log_source::retry::RetryPolicy;
use incident_log_weather::WeatherConfig;
use serde::Deserialize;

use crate::IngestError;

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// `[fetch]` section: how documents are downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// `User-Agent` header sent with document requests.
    pub user_agent: String,
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further retry.
    pub retry_base_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux i686) AppleWebKit/537.17 (KHTML, like Gecko) \
                         Chrome/24.0.1312.27 Safari/537.17"
                .to_string(),
            max_retries: 3,
            retry_base_delay_ms: 2000,
        }
    }
}

impl FetchConfig {
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }
}

/// Everything one `incident_log` run needs besides its URL list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub template: TemplateConfig,
    pub augment: AugmentConfig,
    pub fetch: FetchConfig,
    pub weather: WeatherConfig,
}

impl RunConfig {
    /// Parses a run configuration from TOML.
    ///
    /// # Errors
    ///
    /// * [`IngestError::ConfigParse`] if the TOML is invalid
    /// * [`IngestError::Extract`] if the `[template]` section is unusable
    pub fn from_toml(toml_str: &str) -> Result<Self, IngestError> {
        let config: Self = toml::de::from_str(toml_str)?;
        config.template.validate()?;
        Ok(config)
    }

    /// Returns the embedded default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the embedded TOML is malformed (caught by
    /// the tests below).
    pub fn embedded() -> Result<Self, IngestError> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Loads `path` if given, otherwise the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, IngestError> {
        match path {
            Some(path) => {
                log::info!("Loading run configuration from {}", path.display());
                Self::from_toml(&std::fs::read_to_string(path)?)
            }
            None => Self::embedded(),
        }
    }
}
