//! Command-line interface definitions.

pub mod commands;

pub use commands::{
    BalanceCmd, CliApp, Command, DepthCmd, ExportCmd, OhlcCmd, OpenOrdersCmd, PairsCmd, SpreadCmd,
    TickerCmd, TimeCmd, TradeBalanceCmd, TradesCmd,
};
