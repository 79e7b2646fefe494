//! bitcoincharts.com chart adapter.

pub mod client;

pub use client::{ChartsClient, ChartsConfig, ChartsError};
