//! Kraken REST API adapter.
//!
//! Public market-data endpoints plus the signed private account endpoints.
//! All calls are one-shot: errors reported by the exchange or the transport
//! propagate to the caller, there is no retry policy.

pub mod client;
pub mod sign;
pub mod types;

pub use client::{KrakenClient, KrakenConfig};
pub use types::{
    AssetPair, DepthEntry, KrakenError, KrakenResponse, OhlcRecord, OhlcResult, OpenOrders,
    OrderBook, PairTicker, ServerTime, SpreadRecord, SpreadResult, TradeBalance, TradeRecord,
    TradesResult,
};
