//! HTTP client for the bitcoincharts `chart.json` endpoint.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use crate::domain::{ChartInterval, ChartRow};

const CHART_API: &str = "https://bitcoincharts.com/charts/chart.json";

/// Errors from the charts adapter.
#[derive(Debug, Error)]
pub enum ChartsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response shape: {0}")]
    Parse(String),
}

/// Charts client configuration
#[derive(Debug, Clone)]
pub struct ChartsConfig {
    /// Chart endpoint URL
    pub api_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            api_url: CHART_API.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// bitcoincharts chart client
#[derive(Debug, Clone)]
pub struct ChartsClient {
    config: ChartsConfig,
    http: Client,
}

impl ChartsClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self, ChartsError> {
        Self::with_config(ChartsConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ChartsConfig) -> Result<Self, ChartsError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    /// Fetch OHLC history for one market symbol.
    ///
    /// `days` limits the history to the last N days; `None` requests all
    /// available data (the endpoint treats an empty `r` as all time).
    pub async fn fetch_history(
        &self,
        market: &str,
        interval: ChartInterval,
        days: Option<u32>,
    ) -> Result<Vec<ChartRow>, ChartsError> {
        let days_param = days.map(|d| d.to_string()).unwrap_or_default();
        let rows: Vec<ChartRow> = self
            .http
            .get(&self.config.api_url)
            .query(&[
                ("m", market),
                ("r", days_param.as_str()),
                ("i", interval.as_param()),
            ])
            .send()
            .await?
            .json()
            .await?;

        tracing::debug!(market, rows = rows.len(), "fetched chart history");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ChartsConfig::default();
        assert_eq!(config.api_url, CHART_API);
    }

    #[test]
    fn test_client_creation() {
        assert!(ChartsClient::new().is_ok());
    }
}
