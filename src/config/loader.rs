//! Configuration Loader
//!
//! Loads and validates configuration from TOML files, plus the two-line
//! Kraken credential file.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::domain::ChartInterval;

/// Main configuration structure matching coinsheets.toml
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub kraken: KrakenSection,
    #[serde(default)]
    pub charts: ChartsSection,
    #[serde(default)]
    pub export: ExportSection,
}

/// Kraken API configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct KrakenSection {
    /// REST API base URL
    #[serde(default = "default_kraken_url")]
    pub api_url: String,
    /// Path to the two-line credential file (API key, API secret)
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
}

fn default_kraken_url() -> String {
    "https://api.kraken.com".to_string()
}

fn default_credentials_path() -> String {
    "credentials.txt".to_string()
}

impl Default for KrakenSection {
    fn default() -> Self {
        Self {
            api_url: default_kraken_url(),
            credentials_path: default_credentials_path(),
        }
    }
}

/// bitcoincharts configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ChartsSection {
    /// Chart endpoint URL
    #[serde(default = "default_charts_url")]
    pub api_url: String,
    /// Market symbols to export, one spreadsheet each
    #[serde(default = "default_markets")]
    pub markets: Vec<String>,
    /// Interval name (`1-min` .. `Weekly`)
    #[serde(default = "default_chart_interval")]
    pub interval: String,
    /// Days of history; omit for all time
    #[serde(default)]
    pub days: Option<u32>,
}

fn default_charts_url() -> String {
    "https://bitcoincharts.com/charts/chart.json".to_string()
}

fn default_markets() -> Vec<String> {
    ["krakenUSD", "bitfinexUSD", "bitstampUSD", "btceUSD"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_chart_interval() -> String {
    "Daily".to_string()
}

impl Default for ChartsSection {
    fn default() -> Self {
        Self {
            api_url: default_charts_url(),
            markets: default_markets(),
            interval: default_chart_interval(),
            days: None,
        }
    }
}

/// Spreadsheet export configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ExportSection {
    /// Directory the per-market CSV files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_output_dir() -> String {
    ".".to_string()
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Invalid credential file: {0}")]
    CredentialError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Load from `path` when it exists, otherwise fall back to defaults.
    /// Public endpoints need no configuration, so a missing file is fine.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        if path.as_ref().exists() {
            load_config(path)
        } else {
            tracing::debug!(
                "config file {} not found, using defaults",
                path.as_ref().display()
            );
            Ok(Config::default())
        }
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kraken.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "kraken.api_url cannot be empty".to_string(),
            ));
        }

        if self.charts.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "charts.api_url cannot be empty".to_string(),
            ));
        }

        if self.charts.markets.is_empty() {
            return Err(ConfigError::ValidationError(
                "charts.markets cannot be empty".to_string(),
            ));
        }

        if ChartInterval::from_name(&self.charts.interval).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "charts.interval '{}' is not a documented interval name",
                self.charts.interval
            )));
        }

        if self.export.output_dir.is_empty() {
            return Err(ConfigError::ValidationError(
                "export.output_dir cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Kraken API credential pair.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    /// Read credentials from a file with two lines: API key, API secret.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path)?;
        let mut lines = content.lines().map(str::trim);

        let api_key = lines
            .next()
            .filter(|l| !l.is_empty())
            .ok_or_else(|| ConfigError::CredentialError("missing API key on line 1".into()))?
            .to_string();
        let api_secret = lines
            .next()
            .filter(|l| !l.is_empty())
            .ok_or_else(|| ConfigError::CredentialError("missing API secret on line 2".into()))?
            .to_string();

        Ok(Self {
            api_key,
            api_secret,
        })
    }

    /// Resolve credentials: `KRAKEN_API_KEY` / `KRAKEN_API_SECRET`
    /// environment variables first, then the configured file (tilde
    /// expanded).
    pub fn resolve(credentials_path: &str) -> Result<Self, ConfigError> {
        if let (Ok(api_key), Ok(api_secret)) = (
            std::env::var("KRAKEN_API_KEY"),
            std::env::var("KRAKEN_API_SECRET"),
        ) {
            if !api_key.is_empty() && !api_secret.is_empty() {
                return Ok(Self {
                    api_key,
                    api_secret,
                });
            }
        }

        let path = shellexpand::tilde(credentials_path).to_string();
        Self::from_file(path)
    }
}
