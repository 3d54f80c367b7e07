//! Configuration management for speedwatch.
//!
//! Configuration is loaded with figment from TOML config files,
//! environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::limit::{SpeedLimit, DEFAULT_LIMIT_KMH};
use crate::source::WatchOptions;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "speedwatch";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SPEEDWATCH_`)
/// 2. TOML config file at `~/.config/speedwatch/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Subscription options for the location source.
    pub watch: WatchConfig,
    /// Speed limit configuration.
    pub limit: LimitConfig,
}

/// Subscription-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Ask the provider for its most accurate positioning mode.
    pub high_accuracy: bool,
    /// Maximum acceptable age of a delivered fix in milliseconds.
    /// Set to 0 to accept every fix.
    pub max_sample_age_ms: u64,
    /// How long to wait for a fix before reporting a timeout, in
    /// milliseconds.
    pub timeout_ms: u64,
}

/// Speed limit configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    /// The speed limit in km/h.
    pub speed_kmh: f64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            max_sample_age_ms: 0,
            timeout_ms: 10_000,
        }
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_LIMIT_KMH,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("SPEEDWATCH_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.watch.timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "timeout_ms must be greater than 0".to_string(),
            });
        }

        if !self.limit.speed_kmh.is_finite() || self.limit.speed_kmh <= 0.0 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "speed_kmh must be a positive number, got {}",
                    self.limit.speed_kmh
                ),
            });
        }

        Ok(())
    }

    /// The subscription options described by this configuration.
    #[must_use]
    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            high_accuracy: self.watch.high_accuracy,
            max_sample_age: Duration::from_millis(self.watch.max_sample_age_ms),
            timeout: Duration::from_millis(self.watch.timeout_ms),
        }
    }

    /// The speed limit described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured value is not a valid limit.
    pub fn speed_limit(&self) -> Result<SpeedLimit> {
        SpeedLimit::new(self.limit.speed_kmh).map_err(Error::from)
    }
}
