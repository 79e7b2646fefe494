//! Kraken response types and reshaping.
//!
//! Every endpoint answers with the `{"error": [...], "result": ...}`
//! envelope. Prices and volumes arrive as string-encoded decimals; typed
//! records keep them as `Decimal` where the shape is fixed and as raw JSON
//! where it is not.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Errors from the Kraken adapter.
#[derive(Debug, Error)]
pub enum KrakenError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-empty `error` array in the response envelope, messages joined.
    #[error("Kraken API error: {0}")]
    Api(String),
    #[error("credentials required: {0}")]
    MissingCredentials(String),
    #[error("invalid API secret: {0}")]
    InvalidSecret(String),
    #[error("invalid OHLC interval: {0} minutes")]
    InvalidInterval(u32),
    #[error("unexpected response shape: {0}")]
    Parse(String),
}

/// The envelope every Kraken endpoint uses.
#[derive(Debug, Clone, Deserialize)]
pub struct KrakenResponse<T> {
    #[serde(default)]
    pub error: Vec<String>,
    pub result: Option<T>,
}

impl<T> KrakenResponse<T> {
    /// Unwrap the envelope, mapping exchange-reported errors to `Api`.
    pub fn into_result(self) -> Result<T, KrakenError> {
        if !self.error.is_empty() {
            return Err(KrakenError::Api(self.error.join(", ")));
        }
        self.result
            .ok_or_else(|| KrakenError::Parse("missing result field".into()))
    }
}

/// `/0/public/Time` result.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerTime {
    pub unixtime: i64,
    pub rfc1123: String,
}

impl ServerTime {
    /// Server time as a UTC datetime, if the timestamp is representable.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.unixtime, 0)
    }
}

/// `/0/public/AssetPairs` entry. Optional fields tolerate schema drift
/// across pair classes.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetPair {
    pub altname: Option<String>,
    pub base: Option<String>,
    pub quote: Option<String>,
    pub pair_decimals: Option<u32>,
    pub lot_decimals: Option<u32>,
    pub lot_multiplier: Option<f64>,
    #[serde(default)]
    pub leverage_buy: Vec<f64>,
    #[serde(default)]
    pub leverage_sell: Vec<f64>,
    #[serde(default)]
    pub fees: Vec<Vec<f64>>,
    #[serde(default)]
    pub fees_maker: Vec<Vec<f64>>,
    pub fee_volume_currency: Option<String>,
    pub margin_call: Option<f64>,
    pub margin_stop: Option<f64>,
    pub ordermin: Option<String>,
}

/// Documented ticker short keys and their readable names.
///
/// This mapping is the reshaping contract: each short key from the Ticker
/// payload maps to exactly one output name and vice versa.
pub const TICKER_KEY_MAP: [(&str, &str); 9] = [
    ("a", "ask"),
    ("b", "bid"),
    ("c", "last_trade"),
    ("v", "volume"),
    ("p", "weighted_volume"),
    ("t", "trade_nb"),
    ("l", "low"),
    ("h", "high"),
    ("o", "open"),
];

/// Rename the short keys of a raw ticker object to their readable names.
/// Keys outside the documented set are carried through untouched.
pub fn rename_ticker_keys(raw: serde_json::Map<String, serde_json::Value>) -> serde_json::Map<String, serde_json::Value> {
    let mut renamed = serde_json::Map::with_capacity(raw.len());
    for (key, value) in raw {
        let name = TICKER_KEY_MAP
            .iter()
            .find(|(short, _)| *short == key)
            .map(|(_, long)| (*long).to_string())
            .unwrap_or(key);
        renamed.insert(name, value);
    }
    renamed
}

/// `/0/public/Ticker` entry for one pair, with short keys renamed.
#[derive(Debug, Clone, Deserialize)]
pub struct PairTicker {
    /// `[price, whole lot volume, lot volume]`
    #[serde(rename = "a")]
    pub ask: [String; 3],
    /// `[price, whole lot volume, lot volume]`
    #[serde(rename = "b")]
    pub bid: [String; 3],
    /// `[price, lot volume]`
    #[serde(rename = "c")]
    pub last_trade: [String; 2],
    /// `[today, last 24 hours]`
    #[serde(rename = "v")]
    pub volume: [String; 2],
    /// Volume weighted average price `[today, last 24 hours]`
    #[serde(rename = "p")]
    pub weighted_volume: [String; 2],
    /// Number of trades `[today, last 24 hours]`
    #[serde(rename = "t")]
    pub trade_nb: [i64; 2],
    /// `[today, last 24 hours]`
    #[serde(rename = "l")]
    pub low: [String; 2],
    /// `[today, last 24 hours]`
    #[serde(rename = "h")]
    pub high: [String; 2],
    /// Today's opening price
    #[serde(rename = "o")]
    pub open: String,
}

impl PairTicker {
    pub fn ask_price(&self) -> Option<Decimal> {
        Decimal::from_str(&self.ask[0]).ok()
    }

    pub fn bid_price(&self) -> Option<Decimal> {
        Decimal::from_str(&self.bid[0]).ok()
    }

    pub fn last_price(&self) -> Option<Decimal> {
        Decimal::from_str(&self.last_trade[0]).ok()
    }
}

/// One OHLC candle: `[time, open, high, low, close, vwap, volume, count]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcRecord {
    pub time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub vwap: Decimal,
    pub volume: Decimal,
    pub count: i64,
}

/// `/0/public/OHLC` result: candles per pair plus the `last` cursor.
#[derive(Debug, Clone, Default)]
pub struct OhlcResult {
    pub pairs: HashMap<String, Vec<OhlcRecord>>,
    /// Id to use as `since` when polling for new committed candles.
    pub last: Option<i64>,
}

fn decimal_at(row: &[serde_json::Value], idx: usize) -> Option<Decimal> {
    Decimal::from_str(row.get(idx)?.as_str()?).ok()
}

pub(crate) fn parse_ohlc_row(row: &[serde_json::Value]) -> Option<OhlcRecord> {
    if row.len() < 8 {
        return None;
    }
    Some(OhlcRecord {
        time: row[0].as_i64()?,
        open: decimal_at(row, 1)?,
        high: decimal_at(row, 2)?,
        low: decimal_at(row, 3)?,
        close: decimal_at(row, 4)?,
        vwap: decimal_at(row, 5)?,
        volume: decimal_at(row, 6)?,
        count: row[7].as_i64()?,
    })
}

pub(crate) fn parse_ohlc_result(value: serde_json::Value) -> Result<OhlcResult, KrakenError> {
    let map = match value {
        serde_json::Value::Object(map) => map,
        other => {
            return Err(KrakenError::Parse(format!(
                "expected OHLC object, got {other}"
            )))
        }
    };

    let mut result = OhlcResult::default();
    for (key, entry) in map {
        if key == "last" {
            result.last = entry.as_i64();
            continue;
        }
        let rows = entry
            .as_array()
            .ok_or_else(|| KrakenError::Parse(format!("OHLC rows for {key} not an array")))?;
        let candles = rows
            .iter()
            .filter_map(|row| row.as_array().and_then(|r| parse_ohlc_row(r)))
            .collect();
        result.pairs.insert(key, candles);
    }
    Ok(result)
}

/// One order book level: `[price, volume, timestamp]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthEntry {
    pub price: Decimal,
    pub volume: Decimal,
    pub timestamp: i64,
}

/// `/0/public/Depth` result for one pair.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    pub asks: Vec<DepthEntry>,
    pub bids: Vec<DepthEntry>,
}

pub(crate) fn parse_depth_entry(row: &[serde_json::Value]) -> Option<DepthEntry> {
    if row.len() < 3 {
        return None;
    }
    Some(DepthEntry {
        price: decimal_at(row, 0)?,
        volume: decimal_at(row, 1)?,
        timestamp: row[2].as_i64()?,
    })
}

fn parse_depth_side(value: Option<&serde_json::Value>) -> Vec<DepthEntry> {
    value
        .and_then(|v| v.as_array())
        .map(|rows| {
            rows.iter()
                .filter_map(|row| row.as_array().and_then(|r| parse_depth_entry(r)))
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn parse_order_book(
    pair: &str,
    value: serde_json::Value,
) -> Result<OrderBook, KrakenError> {
    let book = value
        .get(pair)
        .ok_or_else(|| KrakenError::Parse(format!("no depth entry for pair {pair}")))?;
    Ok(OrderBook {
        asks: parse_depth_side(book.get("asks")),
        bids: parse_depth_side(book.get("bids")),
    })
}

/// One public trade:
/// `[price, volume, time, buy/sell, market/limit, miscellaneous]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub price: Decimal,
    pub volume: Decimal,
    /// Trade time with fractional seconds, as reported.
    pub time: f64,
    /// `"buy"` or `"sell"`, when reported.
    pub side: Option<String>,
    /// `"market"` or `"limit"`, when reported.
    pub order_kind: Option<String>,
    pub misc: String,
}

/// `/0/public/Trades` result for one pair.
#[derive(Debug, Clone, Default)]
pub struct TradesResult {
    pub trades: Vec<TradeRecord>,
    /// Id to use as `since` when polling for new trades.
    pub last: Option<String>,
}

pub(crate) fn parse_trade_row(row: &[serde_json::Value]) -> Option<TradeRecord> {
    if row.len() < 6 {
        return None;
    }
    let side = match row[3].as_str() {
        Some("b") => Some("buy".to_string()),
        Some("s") => Some("sell".to_string()),
        _ => None,
    };
    let order_kind = match row[4].as_str() {
        Some("m") => Some("market".to_string()),
        Some("l") => Some("limit".to_string()),
        _ => None,
    };
    Some(TradeRecord {
        price: decimal_at(row, 0)?,
        volume: decimal_at(row, 1)?,
        time: row[2].as_f64()?,
        side,
        order_kind,
        misc: row[5].as_str().unwrap_or_default().to_string(),
    })
}

pub(crate) fn parse_trades_result(
    pair: &str,
    value: serde_json::Value,
) -> Result<TradesResult, KrakenError> {
    let rows = value
        .get(pair)
        .and_then(|v| v.as_array())
        .ok_or_else(|| KrakenError::Parse(format!("no trades entry for pair {pair}")))?;
    let trades = rows
        .iter()
        .filter_map(|row| row.as_array().and_then(|r| parse_trade_row(r)))
        .collect();
    let last = value
        .get("last")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    Ok(TradesResult { trades, last })
}

/// One spread sample: `[time, bid, ask]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadRecord {
    pub time: i64,
    pub bid: Decimal,
    pub ask: Decimal,
}

/// `/0/public/Spread` result for one pair.
#[derive(Debug, Clone, Default)]
pub struct SpreadResult {
    pub spreads: Vec<SpreadRecord>,
    /// Id to use as `since` when polling for new spread data.
    pub last: Option<i64>,
}

pub(crate) fn parse_spread_row(row: &[serde_json::Value]) -> Option<SpreadRecord> {
    if row.len() < 3 {
        return None;
    }
    Some(SpreadRecord {
        time: row[0].as_i64()?,
        bid: decimal_at(row, 1)?,
        ask: decimal_at(row, 2)?,
    })
}

pub(crate) fn parse_spread_result(
    pair: &str,
    value: serde_json::Value,
) -> Result<SpreadResult, KrakenError> {
    let rows = value
        .get(pair)
        .and_then(|v| v.as_array())
        .ok_or_else(|| KrakenError::Parse(format!("no spread entry for pair {pair}")))?;
    let spreads = rows
        .iter()
        .filter_map(|row| row.as_array().and_then(|r| parse_spread_row(r)))
        .collect();
    let last = value.get("last").and_then(|v| v.as_i64());
    Ok(SpreadResult { spreads, last })
}

/// `/0/private/TradeBalance` result, short keys renamed.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeBalance {
    /// Combined balance of all currencies
    #[serde(rename = "eb")]
    pub equivalent_balance: String,
    /// Combined balance of all equity currencies
    #[serde(rename = "tb")]
    pub trade_balance: String,
    /// Margin amount of open positions
    #[serde(rename = "m", default)]
    pub margin: Option<String>,
    /// Unrealized net profit/loss of open positions
    #[serde(rename = "n", default)]
    pub unrealized_pnl: Option<String>,
    /// Cost basis of open positions
    #[serde(rename = "c", default)]
    pub cost_basis: Option<String>,
    /// Current floating valuation of open positions
    #[serde(rename = "v", default)]
    pub valuation: Option<String>,
    /// Equity: trade balance + unrealized net profit/loss
    #[serde(rename = "e", default)]
    pub equity: Option<String>,
    /// Free margin: equity - initial margin
    #[serde(rename = "mf", default)]
    pub free_margin: Option<String>,
    /// Margin level percentage
    #[serde(rename = "ml", default)]
    pub margin_level: Option<String>,
}

/// `/0/private/OpenOrders` result. Order descriptions stay as raw JSON,
/// keyed by transaction id.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenOrders {
    #[serde(default)]
    pub open: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_envelope_with_error() {
        let json = r#"{"error": ["EQuery:Unknown asset pair"]}"#;
        let resp: KrakenResponse<serde_json::Value> = serde_json::from_str(json).unwrap();
        let err = resp.into_result().unwrap_err();
        assert!(matches!(err, KrakenError::Api(ref m) if m.contains("Unknown asset pair")));
    }

    #[test]
    fn test_envelope_with_result() {
        let json = r#"{"error": [], "result": {"unixtime": 1497624192, "rfc1123": "Fri, 16 Jun 17 14:43:12 +0000"}}"#;
        let resp: KrakenResponse<ServerTime> = serde_json::from_str(json).unwrap();
        let time = resp.into_result().unwrap();
        assert_eq!(time.unixtime, 1497624192);
        assert!(time.datetime().is_some());
    }

    #[test]
    fn test_envelope_missing_result() {
        let json = r#"{"error": []}"#;
        let resp: KrakenResponse<ServerTime> = serde_json::from_str(json).unwrap();
        assert!(matches!(resp.into_result(), Err(KrakenError::Parse(_))));
    }

    #[test]
    fn test_ticker_key_map_is_bijective() {
        let shorts: HashSet<&str> = TICKER_KEY_MAP.iter().map(|(s, _)| *s).collect();
        let longs: HashSet<&str> = TICKER_KEY_MAP.iter().map(|(_, l)| *l).collect();

        assert_eq!(shorts.len(), TICKER_KEY_MAP.len());
        assert_eq!(longs.len(), TICKER_KEY_MAP.len());

        let documented: HashSet<&str> =
            ["a", "b", "c", "v", "p", "t", "l", "h", "o"].into_iter().collect();
        assert_eq!(shorts, documented);
    }

    #[test]
    fn test_rename_ticker_keys() {
        let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(
            r#"{"a": ["1.0", "1", "1.0"], "o": "0.9", "unknown": 1}"#,
        )
        .unwrap();
        let renamed = rename_ticker_keys(raw);

        assert!(renamed.contains_key("ask"));
        assert!(renamed.contains_key("open"));
        assert!(renamed.contains_key("unknown"));
        assert!(!renamed.contains_key("a"));
        assert!(!renamed.contains_key("o"));
    }

    #[test]
    fn test_pair_ticker_deserializes_short_keys() {
        let json = r#"{
            "a": ["3500.1", "1", "1.000"],
            "b": ["3500.0", "2", "2.000"],
            "c": ["3500.05", "0.1"],
            "v": ["100.0", "250.0"],
            "p": ["3499.0", "3480.5"],
            "t": [120, 340],
            "l": ["3400.0", "3390.0"],
            "h": ["3550.0", "3560.0"],
            "o": "3450.0"
        }"#;
        let ticker: PairTicker = serde_json::from_str(json).unwrap();

        assert_eq!(ticker.ask[0], "3500.1");
        assert_eq!(ticker.trade_nb, [120, 340]);
        assert_eq!(ticker.open, "3450.0");
        assert_eq!(ticker.ask_price().unwrap().to_string(), "3500.1");
        assert_eq!(ticker.last_price().unwrap().to_string(), "3500.05");
    }

    #[test]
    fn test_parse_ohlc_result() {
        let value: serde_json::Value = serde_json::from_str(
            r#"{
                "XETHZUSD": [
                    [1497600000, "350.0", "355.0", "348.0", "352.0", "351.2", "1200.5", 830],
                    [1497600060, "352.0", "353.0", "351.0", "351.5", "352.1", "600.0", 412]
                ],
                "last": 1497600060
            }"#,
        )
        .unwrap();

        let result = parse_ohlc_result(value).unwrap();
        assert_eq!(result.last, Some(1497600060));

        let candles = &result.pairs["XETHZUSD"];
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time, 1497600000);
        assert_eq!(candles[0].open.to_string(), "350.0");
        assert_eq!(candles[1].count, 412);
    }

    #[test]
    fn test_parse_ohlc_row_short() {
        let row: Vec<serde_json::Value> =
            serde_json::from_str(r#"[1497600000, "350.0"]"#).unwrap();
        assert!(parse_ohlc_row(&row).is_none());
    }

    #[test]
    fn test_parse_order_book() {
        let value: serde_json::Value = serde_json::from_str(
            r#"{
                "XETHZUSD": {
                    "asks": [["352.5", "10.0", 1497600100], ["353.0", "4.2", 1497600090]],
                    "bids": [["351.9", "7.5", 1497600101]]
                }
            }"#,
        )
        .unwrap();

        let book = parse_order_book("XETHZUSD", value).unwrap();
        assert_eq!(book.asks.len(), 2);
        assert_eq!(book.bids.len(), 1);
        assert_eq!(book.asks[0].price.to_string(), "352.5");
        assert_eq!(book.bids[0].timestamp, 1497600101);
    }

    #[test]
    fn test_parse_order_book_missing_pair() {
        let value: serde_json::Value = serde_json::from_str(r#"{}"#).unwrap();
        assert!(matches!(
            parse_order_book("XETHZUSD", value),
            Err(KrakenError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_trades_result() {
        let value: serde_json::Value = serde_json::from_str(
            r#"{
                "XETHZUSD": [
                    ["352.1", "0.5", 1497600100.1234, "b", "l", ""],
                    ["352.0", "1.5", 1497600101.5678, "s", "m", ""]
                ],
                "last": "1497600101567800000"
            }"#,
        )
        .unwrap();

        let result = parse_trades_result("XETHZUSD", value).unwrap();
        assert_eq!(result.trades.len(), 2);
        assert_eq!(result.trades[0].side.as_deref(), Some("buy"));
        assert_eq!(result.trades[0].order_kind.as_deref(), Some("limit"));
        assert_eq!(result.trades[1].side.as_deref(), Some("sell"));
        assert_eq!(result.last.as_deref(), Some("1497600101567800000"));
    }

    #[test]
    fn test_parse_spread_result() {
        let value: serde_json::Value = serde_json::from_str(
            r#"{
                "XETHZUSD": [
                    [1497600100, "351.9", "352.5"],
                    [1497600101, "352.0", "352.4"]
                ],
                "last": 1497600101
            }"#,
        )
        .unwrap();

        let result = parse_spread_result("XETHZUSD", value).unwrap();
        assert_eq!(result.spreads.len(), 2);
        assert_eq!(result.spreads[0].bid.to_string(), "351.9");
        assert_eq!(result.spreads[1].ask.to_string(), "352.4");
        assert_eq!(result.last, Some(1497600101));
    }

    #[test]
    fn test_trade_balance_short_keys() {
        let json = r#"{"eb": "1000.0", "tb": "950.0", "m": "0.0", "mf": "950.0"}"#;
        let balance: TradeBalance = serde_json::from_str(json).unwrap();
        assert_eq!(balance.equivalent_balance, "1000.0");
        assert_eq!(balance.trade_balance, "950.0");
        assert_eq!(balance.free_margin.as_deref(), Some("950.0"));
        assert!(balance.margin_level.is_none());
    }

    #[test]
    fn test_asset_pair_partial_fields() {
        let json = r#"{"altname": "ETHUSD", "base": "XETH", "quote": "ZUSD", "pair_decimals": 2}"#;
        let pair: AssetPair = serde_json::from_str(json).unwrap();
        assert_eq!(pair.altname.as_deref(), Some("ETHUSD"));
        assert_eq!(pair.pair_decimals, Some(2));
        assert!(pair.fees.is_empty());
    }
}
