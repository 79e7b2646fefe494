//! Kraken API client.
//!
//! Thin request wrappers over the public and private REST endpoints. Every
//! call is build URL, send, unwrap envelope, reshape; failures propagate as
//! `KrakenError` with no retry.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::Credentials;
use crate::domain::OhlcInterval;

use super::sign::{encode_form, sign_request, NonceSource};
use super::types::{
    parse_ohlc_result, parse_order_book, parse_spread_result, parse_trades_result,
    rename_ticker_keys, AssetPair, KrakenError, KrakenResponse, OhlcResult, OpenOrders, OrderBook,
    PairTicker, ServerTime, SpreadResult, TradeBalance, TradesResult,
};

/// Kraken client configuration
#[derive(Debug, Clone)]
pub struct KrakenConfig {
    /// Base URL for the REST API
    pub api_base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for KrakenConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.kraken.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Kraken REST client
#[derive(Debug)]
pub struct KrakenClient {
    config: KrakenConfig,
    http: Client,
    credentials: Option<Credentials>,
    nonce: NonceSource,
}

impl KrakenClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self, KrakenError> {
        Self::with_config(KrakenConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: KrakenConfig) -> Result<Self, KrakenError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            http,
            credentials: None,
            nonce: NonceSource::new(),
        })
    }

    /// Attach API credentials for private endpoints
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Get the configured API base URL
    pub fn api_base_url(&self) -> &str {
        &self.config.api_base_url
    }

    async fn public_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, KrakenError> {
        let url = format!("{}{}", self.config.api_base_url, path);
        let response: KrakenResponse<T> = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await?
            .json()
            .await?;
        response.into_result()
    }

    async fn private_post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        fields: &[(&str, String)],
    ) -> Result<T, KrakenError> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            KrakenError::MissingCredentials(format!(
                "endpoint {endpoint} requires an API key and secret"
            ))
        })?;

        let nonce = self.nonce.next();
        let mut body_fields: Vec<(&str, String)> = vec![("nonce", nonce.to_string())];
        body_fields.extend(fields.iter().map(|(k, v)| (*k, v.clone())));
        let body = encode_form(&body_fields);

        let path = format!("/0/private/{endpoint}");
        let signature = sign_request(&credentials.api_secret, &path, nonce, &body)?;

        let url = format!("{}{}", self.config.api_base_url, path);
        let response: KrakenResponse<T> = self
            .http
            .post(&url)
            .header("API-Key", &credentials.api_key)
            .header("API-Sign", signature)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?
            .json()
            .await?;
        response.into_result()
    }

    /// Fetch the exchange server time
    pub async fn server_time(&self) -> Result<ServerTime, KrakenError> {
        self.public_get("/0/public/Time", &[]).await
    }

    /// Fetch tradable asset pair details (`pair` may be a comma list)
    pub async fn asset_pairs(
        &self,
        pair: &str,
    ) -> Result<HashMap<String, AssetPair>, KrakenError> {
        self.public_get("/0/public/AssetPairs", &[("pair", pair.to_string())])
            .await
    }

    /// Check whether an asset pair exists. An exchange-reported error means
    /// the pair is unknown; transport failures still propagate.
    pub async fn pair_exists(&self, pair: &str) -> Result<bool, KrakenError> {
        match self.asset_pairs(pair).await {
            Ok(_) => Ok(true),
            Err(KrakenError::Api(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Fetch the ticker summary, typed, keyed by pair name
    pub async fn ticker(&self, pair: &str) -> Result<HashMap<String, PairTicker>, KrakenError> {
        self.public_get("/0/public/Ticker", &[("pair", pair.to_string())])
            .await
    }

    /// Fetch the ticker as raw JSON with the documented short keys renamed
    /// to readable names, keyed by pair name
    pub async fn ticker_renamed(
        &self,
        pair: &str,
    ) -> Result<HashMap<String, serde_json::Value>, KrakenError> {
        let raw: HashMap<String, serde_json::Value> = self
            .public_get("/0/public/Ticker", &[("pair", pair.to_string())])
            .await?;
        Ok(raw
            .into_iter()
            .map(|(name, value)| match value {
                serde_json::Value::Object(map) => {
                    (name, serde_json::Value::Object(rename_ticker_keys(map)))
                }
                other => (name, other),
            })
            .collect())
    }

    /// Fetch OHLC candles. `interval_minutes` must be in the documented set;
    /// invalid values are rejected before any request is made.
    pub async fn ohlc(
        &self,
        pair: &str,
        interval_minutes: u32,
        since: Option<i64>,
    ) -> Result<OhlcResult, KrakenError> {
        let interval = OhlcInterval::from_minutes(interval_minutes)
            .ok_or(KrakenError::InvalidInterval(interval_minutes))?;

        let mut params = vec![
            ("pair", pair.to_string()),
            ("interval", interval.minutes().to_string()),
        ];
        if let Some(since) = since {
            params.push(("since", since.to_string()));
        }

        let value: serde_json::Value = self.public_get("/0/public/OHLC", &params).await?;
        parse_ohlc_result(value)
    }

    /// Fetch the order book for a single pair
    pub async fn order_book(
        &self,
        pair: &str,
        count: Option<u32>,
    ) -> Result<OrderBook, KrakenError> {
        let mut params = vec![("pair", pair.to_string())];
        if let Some(count) = count {
            params.push(("count", count.to_string()));
        }
        let value: serde_json::Value = self.public_get("/0/public/Depth", &params).await?;
        parse_order_book(pair, value)
    }

    /// Fetch recent trades for a single pair
    pub async fn recent_trades(
        &self,
        pair: &str,
        since: Option<&str>,
    ) -> Result<TradesResult, KrakenError> {
        let mut params = vec![("pair", pair.to_string())];
        if let Some(since) = since {
            params.push(("since", since.to_string()));
        }
        let value: serde_json::Value = self.public_get("/0/public/Trades", &params).await?;
        parse_trades_result(pair, value)
    }

    /// Fetch recent spread samples for a single pair
    pub async fn recent_spread(
        &self,
        pair: &str,
        since: Option<i64>,
    ) -> Result<SpreadResult, KrakenError> {
        let mut params = vec![("pair", pair.to_string())];
        if let Some(since) = since {
            params.push(("since", since.to_string()));
        }
        let value: serde_json::Value = self.public_get("/0/public/Spread", &params).await?;
        parse_spread_result(pair, value)
    }

    /// Fetch account balances, asset name to amount
    pub async fn account_balance(&self) -> Result<HashMap<String, String>, KrakenError> {
        self.private_post("Balance", &[]).await
    }

    /// Fetch the trade balance summary. `asset` selects the base asset for
    /// the valuation; the exchange default applies when empty.
    pub async fn trade_balance(&self, asset: Option<&str>) -> Result<TradeBalance, KrakenError> {
        let asset = asset.unwrap_or("").to_string();
        self.private_post("TradeBalance", &[("asset", asset)]).await
    }

    /// Fetch open orders keyed by transaction id
    pub async fn open_orders(&self) -> Result<OpenOrders, KrakenError> {
        self.private_post("OpenOrders", &[]).await
    }
}
