//! Tabular chart record from the bitcoincharts aggregator.

use serde::Deserialize;

/// One row of the `chart.json` response.
///
/// The upstream payload is an array of 8-element arrays:
/// `[time, open, high, low, close, volume(base), volume(quote), price]`.
/// Field order here matches the upstream order exactly; the export column
/// mapping depends on it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawChartRow")]
pub struct ChartRow {
    /// Unix timestamp of the interval start.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Volume in the base asset (BTC).
    pub volume_base: f64,
    /// Volume in the quote currency.
    pub volume_quote: f64,
    /// Weighted price for the interval.
    pub price: f64,
}

#[derive(Deserialize)]
struct RawChartRow(i64, f64, f64, f64, f64, f64, f64, f64);

impl From<RawChartRow> for ChartRow {
    fn from(raw: RawChartRow) -> Self {
        ChartRow {
            timestamp: raw.0,
            open: raw.1,
            high: raw.2,
            low: raw.3,
            close: raw.4,
            volume_base: raw.5,
            volume_quote: raw.6,
            price: raw.7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_row_from_json_array() {
        let json = "[1497624000, 2500.0, 2520.5, 2480.0, 2510.0, 12.5, 31375.0, 2505.3]";
        let row: ChartRow = serde_json::from_str(json).unwrap();

        assert_eq!(row.timestamp, 1497624000);
        assert_eq!(row.open, 2500.0);
        assert_eq!(row.high, 2520.5);
        assert_eq!(row.low, 2480.0);
        assert_eq!(row.close, 2510.0);
        assert_eq!(row.volume_base, 12.5);
        assert_eq!(row.volume_quote, 31375.0);
        assert_eq!(row.price, 2505.3);
    }

    #[test]
    fn test_chart_rows_preserve_order() {
        let json = "[[1, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
                     [3, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0],
                     [2, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0]]";
        let rows: Vec<ChartRow> = serde_json::from_str(json).unwrap();

        // Rows come back in upstream order, unsorted.
        let timestamps: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![1, 3, 2]);
    }

    #[test]
    fn test_chart_row_rejects_short_array() {
        let json = "[1497624000, 2500.0, 2520.5]";
        assert!(serde_json::from_str::<ChartRow>(json).is_err());
    }
}
