//! Interval enumerations for the two chart APIs.
//!
//! Kraken's OHLC endpoint takes an interval in minutes from a fixed set;
//! bitcoincharts takes a named interval string. Both are validated here,
//! before any request is issued.

use std::fmt;

/// Kraken OHLC candle interval, in minutes.
///
/// The API accepts exactly these values; anything else is rejected locally
/// instead of round-tripping to the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OhlcInterval {
    Min1,
    Min5,
    Min15,
    Min30,
    Hour1,
    Hour4,
    Day1,
    Week1,
    Day15,
}

impl OhlcInterval {
    /// All intervals the Kraken OHLC endpoint documents.
    pub const ALL: [OhlcInterval; 9] = [
        OhlcInterval::Min1,
        OhlcInterval::Min5,
        OhlcInterval::Min15,
        OhlcInterval::Min30,
        OhlcInterval::Hour1,
        OhlcInterval::Hour4,
        OhlcInterval::Day1,
        OhlcInterval::Week1,
        OhlcInterval::Day15,
    ];

    /// Interval length in minutes, as sent in the `interval` query parameter.
    pub fn minutes(self) -> u32 {
        match self {
            OhlcInterval::Min1 => 1,
            OhlcInterval::Min5 => 5,
            OhlcInterval::Min15 => 15,
            OhlcInterval::Min30 => 30,
            OhlcInterval::Hour1 => 60,
            OhlcInterval::Hour4 => 240,
            OhlcInterval::Day1 => 1440,
            OhlcInterval::Week1 => 10080,
            OhlcInterval::Day15 => 21600,
        }
    }

    /// Validate a minute count against the documented set.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|i| i.minutes() == minutes)
    }
}

impl Default for OhlcInterval {
    fn default() -> Self {
        OhlcInterval::Min1
    }
}

impl fmt::Display for OhlcInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.minutes())
    }
}

/// Named interval for the bitcoincharts `chart.json` endpoint (`i` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartInterval {
    Min1,
    Min5,
    Min15,
    Min30,
    Hourly,
    Hour2,
    Hour6,
    Hour12,
    Daily,
    Weekly,
}

impl ChartInterval {
    pub const ALL: [ChartInterval; 10] = [
        ChartInterval::Min1,
        ChartInterval::Min5,
        ChartInterval::Min15,
        ChartInterval::Min30,
        ChartInterval::Hourly,
        ChartInterval::Hour2,
        ChartInterval::Hour6,
        ChartInterval::Hour12,
        ChartInterval::Daily,
        ChartInterval::Weekly,
    ];

    /// The exact string the aggregator expects as the `i` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            ChartInterval::Min1 => "1-min",
            ChartInterval::Min5 => "5-min",
            ChartInterval::Min15 => "15-min",
            ChartInterval::Min30 => "30-min",
            ChartInterval::Hourly => "Hourly",
            ChartInterval::Hour2 => "2-hour",
            ChartInterval::Hour6 => "6-hour",
            ChartInterval::Hour12 => "12-hour",
            ChartInterval::Daily => "Daily",
            ChartInterval::Weekly => "Weekly",
        }
    }

    /// Look up an interval by its documented name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|i| i.as_param() == name)
    }
}

impl fmt::Display for ChartInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ohlc_interval_accepts_documented_set() {
        for minutes in [1, 5, 15, 30, 60, 240, 1440, 10080, 21600] {
            let interval = OhlcInterval::from_minutes(minutes);
            assert!(interval.is_some(), "interval {} should be valid", minutes);
            assert_eq!(interval.unwrap().minutes(), minutes);
        }
    }

    #[test]
    fn test_ohlc_interval_rejects_everything_else() {
        for minutes in [0, 2, 3, 10, 45, 120, 720, 21160, 40320, u32::MAX] {
            assert!(
                OhlcInterval::from_minutes(minutes).is_none(),
                "interval {} should be rejected",
                minutes
            );
        }
    }

    #[test]
    fn test_ohlc_interval_set_is_exact() {
        let valid: Vec<u32> = OhlcInterval::ALL.iter().map(|i| i.minutes()).collect();
        assert_eq!(valid, vec![1, 5, 15, 30, 60, 240, 1440, 10080, 21600]);
    }

    #[test]
    fn test_chart_interval_names_round_trip() {
        for interval in ChartInterval::ALL {
            assert_eq!(ChartInterval::from_name(interval.as_param()), Some(interval));
        }
    }

    #[test]
    fn test_chart_interval_unknown_name() {
        assert_eq!(ChartInterval::from_name("3-min"), None);
        assert_eq!(ChartInterval::from_name("daily"), None);
        assert_eq!(ChartInterval::from_name(""), None);
    }
}
