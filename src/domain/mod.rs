//! Domain types shared across adapters and export.

pub mod candle;
pub mod interval;

pub use candle::ChartRow;
pub use interval::{ChartInterval, OhlcInterval};
