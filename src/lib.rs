//! Coinsheets - Kraken and bitcoincharts market data fetcher
//!
//! Fetches public and private Kraken REST endpoints and bitcoincharts
//! historical chart data, reshapes the JSON into tabular records, and prints
//! them or writes one spreadsheet file per market symbol.
//!
//! # Modules
//!
//! - `domain`: Interval enumerations and tabular chart records
//! - `adapters`: External API clients (Kraken, bitcoincharts, CLI)
//! - `config`: Configuration and credential file loading
//! - `export`: Spreadsheet (CSV) writing

pub mod adapters;
pub mod config;
pub mod domain;
pub mod export;
