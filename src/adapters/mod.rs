//! Adapters Layer - External System Implementations
//!
//! - Kraken: exchange REST client (public + signed private endpoints)
//! - Bitcoincharts: aggregator chart history client
//! - CLI: command-line interface definitions

pub mod bitcoincharts;
pub mod cli;
pub mod kraken;

pub use bitcoincharts::ChartsClient;
pub use cli::CliApp;
pub use kraken::KrakenClient;
