//! CLI command definitions for coinsheets.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Coinsheets - Kraken and bitcoincharts market data fetcher
#[derive(Parser, Debug)]
#[command(
    name = "coinsheets",
    version = env!("CARGO_PKG_VERSION"),
    about = "Fetch Kraken market data and export bitcoincharts history to spreadsheets",
    long_about = "Coinsheets calls the public and private REST endpoints of the Kraken \
                  exchange and the bitcoincharts aggregator, reshapes the JSON into \
                  tables, and prints them or writes one CSV file per market symbol."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the exchange server time
    Time(TimeCmd),

    /// Show asset pair details (leverage, fees, margin)
    Pairs(PairsCmd),

    /// Show the ticker summary for one or more pairs
    Ticker(TickerCmd),

    /// Fetch OHLC candles for a pair
    Ohlc(OhlcCmd),

    /// Fetch the order book for a pair
    Depth(DepthCmd),

    /// Fetch recent trades for a pair
    Trades(TradesCmd),

    /// Fetch recent spread samples for a pair
    Spread(SpreadCmd),

    /// Show account balances (private, needs credentials)
    Balance(BalanceCmd),

    /// Show the trade balance summary (private, needs credentials)
    TradeBalance(TradeBalanceCmd),

    /// List open orders (private, needs credentials)
    OpenOrders(OpenOrdersCmd),

    /// Export bitcoincharts history to one CSV per market
    Export(ExportCmd),
}

/// Print server time
#[derive(Parser, Debug)]
pub struct TimeCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/coinsheets.toml")]
    pub config: PathBuf,
}

/// Asset pair details
#[derive(Parser, Debug)]
pub struct PairsCmd {
    /// Asset pair ticker, comma list allowed (e.g. XETHZUSD,DASHEUR)
    #[arg(value_name = "PAIR")]
    pub pair: String,

    /// Only check whether the pair exists
    #[arg(long)]
    pub check: bool,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/coinsheets.toml")]
    pub config: PathBuf,
}

/// Ticker summary
#[derive(Parser, Debug)]
pub struct TickerCmd {
    /// Asset pair ticker, comma list allowed
    #[arg(value_name = "PAIR")]
    pub pair: String,

    /// Print the raw JSON with short keys renamed instead of the summary
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/coinsheets.toml")]
    pub config: PathBuf,
}

/// OHLC candles
#[derive(Parser, Debug)]
pub struct OhlcCmd {
    /// Asset pair ticker
    #[arg(value_name = "PAIR")]
    pub pair: String,

    /// Candle interval in minutes (1, 5, 15, 30, 60, 240, 1440, 10080, 21600)
    #[arg(short, long, value_name = "MINUTES", default_value = "1")]
    pub interval: u32,

    /// Return committed candles since this timestamp (exclusive)
    #[arg(long, value_name = "TIMESTAMP")]
    pub since: Option<i64>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/coinsheets.toml")]
    pub config: PathBuf,
}

/// Order book
#[derive(Parser, Debug)]
pub struct DepthCmd {
    /// Asset pair ticker (single pair)
    #[arg(value_name = "PAIR")]
    pub pair: String,

    /// Maximum number of asks/bids
    #[arg(long, value_name = "N")]
    pub count: Option<u32>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/coinsheets.toml")]
    pub config: PathBuf,
}

/// Recent trades
#[derive(Parser, Debug)]
pub struct TradesCmd {
    /// Asset pair ticker (single pair)
    #[arg(value_name = "PAIR")]
    pub pair: String,

    /// Return trades since this id (exclusive)
    #[arg(long, value_name = "ID")]
    pub since: Option<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/coinsheets.toml")]
    pub config: PathBuf,
}

/// Recent spread samples
#[derive(Parser, Debug)]
pub struct SpreadCmd {
    /// Asset pair ticker (single pair)
    #[arg(value_name = "PAIR")]
    pub pair: String,

    /// Return spread data since this id (inclusive)
    #[arg(long, value_name = "ID")]
    pub since: Option<i64>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/coinsheets.toml")]
    pub config: PathBuf,
}

/// Account balances
#[derive(Parser, Debug)]
pub struct BalanceCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/coinsheets.toml")]
    pub config: PathBuf,

    /// Override the credential file path
    #[arg(long, value_name = "FILE")]
    pub credentials: Option<PathBuf>,
}

/// Trade balance summary
#[derive(Parser, Debug)]
pub struct TradeBalanceCmd {
    /// Base asset for the valuation (exchange default when omitted)
    #[arg(long, value_name = "ASSET")]
    pub asset: Option<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/coinsheets.toml")]
    pub config: PathBuf,

    /// Override the credential file path
    #[arg(long, value_name = "FILE")]
    pub credentials: Option<PathBuf>,
}

/// Open orders
#[derive(Parser, Debug)]
pub struct OpenOrdersCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/coinsheets.toml")]
    pub config: PathBuf,

    /// Override the credential file path
    #[arg(long, value_name = "FILE")]
    pub credentials: Option<PathBuf>,
}

/// Export history to spreadsheets
#[derive(Parser, Debug)]
pub struct ExportCmd {
    /// Market symbol to export (repeatable; config list when omitted)
    #[arg(short, long = "market", value_name = "SYMBOL")]
    pub markets: Vec<String>,

    /// Interval name (1-min, 5-min, 15-min, 30-min, Hourly, 2-hour,
    /// 6-hour, 12-hour, Daily, Weekly)
    #[arg(short, long, value_name = "NAME")]
    pub interval: Option<String>,

    /// Days of history (all time when omitted)
    #[arg(short, long, value_name = "DAYS")]
    pub days: Option<u32>,

    /// Output directory for the CSV files
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/coinsheets.toml")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time() {
        let app = CliApp::try_parse_from(["coinsheets", "time"]).unwrap();
        match app.command {
            Command::Time(cmd) => {
                assert_eq!(cmd.config, PathBuf::from("config/coinsheets.toml"));
            }
            _ => panic!("Expected Time command"),
        }
    }

    #[test]
    fn test_parse_ticker() {
        let app = CliApp::try_parse_from(["coinsheets", "ticker", "XETHZUSD,DASHEUR"]).unwrap();
        match app.command {
            Command::Ticker(cmd) => {
                assert_eq!(cmd.pair, "XETHZUSD,DASHEUR");
                assert!(!cmd.json);
            }
            _ => panic!("Expected Ticker command"),
        }
    }

    #[test]
    fn test_parse_ohlc_with_interval() {
        let app = CliApp::try_parse_from([
            "coinsheets", "ohlc", "XETHZUSD", "--interval", "240", "--since", "1497600000",
        ])
        .unwrap();
        match app.command {
            Command::Ohlc(cmd) => {
                assert_eq!(cmd.pair, "XETHZUSD");
                assert_eq!(cmd.interval, 240);
                assert_eq!(cmd.since, Some(1497600000));
            }
            _ => panic!("Expected Ohlc command"),
        }
    }

    #[test]
    fn test_parse_ohlc_default_interval() {
        let app = CliApp::try_parse_from(["coinsheets", "ohlc", "XETHZUSD"]).unwrap();
        match app.command {
            Command::Ohlc(cmd) => assert_eq!(cmd.interval, 1),
            _ => panic!("Expected Ohlc command"),
        }
    }

    #[test]
    fn test_parse_depth_with_count() {
        let app =
            CliApp::try_parse_from(["coinsheets", "depth", "XETHZUSD", "--count", "10"]).unwrap();
        match app.command {
            Command::Depth(cmd) => {
                assert_eq!(cmd.pair, "XETHZUSD");
                assert_eq!(cmd.count, Some(10));
            }
            _ => panic!("Expected Depth command"),
        }
    }

    #[test]
    fn test_parse_pairs_check() {
        let app = CliApp::try_parse_from(["coinsheets", "pairs", "XETHZUSD", "--check"]).unwrap();
        match app.command {
            Command::Pairs(cmd) => {
                assert_eq!(cmd.pair, "XETHZUSD");
                assert!(cmd.check);
            }
            _ => panic!("Expected Pairs command"),
        }
    }

    #[test]
    fn test_parse_trade_balance_with_asset() {
        let app =
            CliApp::try_parse_from(["coinsheets", "trade-balance", "--asset", "ZUSD"]).unwrap();
        match app.command {
            Command::TradeBalance(cmd) => assert_eq!(cmd.asset.as_deref(), Some("ZUSD")),
            _ => panic!("Expected TradeBalance command"),
        }
    }

    #[test]
    fn test_parse_export_with_flags() {
        let app = CliApp::try_parse_from([
            "coinsheets",
            "export",
            "--market",
            "krakenUSD",
            "--market",
            "bitstampUSD",
            "--interval",
            "Daily",
            "--days",
            "30",
            "--out-dir",
            "sheets",
        ])
        .unwrap();
        match app.command {
            Command::Export(cmd) => {
                assert_eq!(cmd.markets, vec!["krakenUSD", "bitstampUSD"]);
                assert_eq!(cmd.interval.as_deref(), Some("Daily"));
                assert_eq!(cmd.days, Some(30));
                assert_eq!(cmd.out_dir, Some(PathBuf::from("sheets")));
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_parse_export_defaults() {
        let app = CliApp::try_parse_from(["coinsheets", "export"]).unwrap();
        match app.command {
            Command::Export(cmd) => {
                assert!(cmd.markets.is_empty());
                assert!(cmd.interval.is_none());
                assert!(cmd.days.is_none());
            }
            _ => panic!("Expected Export command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let app = CliApp::try_parse_from(["coinsheets", "-v", "--debug", "time"]).unwrap();
        assert!(app.verbose);
        assert!(app.debug);
    }
}
