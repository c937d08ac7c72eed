//! Daily indicator/price series
//!
//! Raw points come from the ingestion adapters. `AlignedSeries` is the
//! validated, index-aligned form the backtester runs on.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One day of the MACD DIF line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub diff: f64,
}

impl IndicatorPoint {
    pub fn new(date: NaiveDate, diff: f64) -> Self {
        Self { date, diff }
    }
}

/// One day of closing prices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Indicator value and close price for the same trading day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub diff: f64,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("Series is empty")]
    Empty,
    #[error("Length mismatch: {indicators} indicator points vs {prices} price points")]
    LengthMismatch { indicators: usize, prices: usize },
    #[error("Date mismatch at index {index}: indicator {indicator} vs price {price}")]
    DateMismatch {
        index: usize,
        indicator: NaiveDate,
        price: NaiveDate,
    },
    #[error("Dates not strictly increasing at index {index} ({date})")]
    NotIncreasing { index: usize, date: NaiveDate },
    #[error("Non-finite DIF value on {date}")]
    NonFiniteDiff { date: NaiveDate },
    #[error("Invalid close price {close} on {date}")]
    InvalidClose { date: NaiveDate, close: f64 },
}

/// Validated indicator and price series, one bar per trading day.
///
/// Read-only once built; share it behind an `Arc` when running several
/// simulations over the same data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedSeries {
    bars: Vec<DailyBar>,
}

impl AlignedSeries {
    /// Zip the two series, rejecting anything the simulator can't trust.
    pub fn new(indicators: &[IndicatorPoint], prices: &[PricePoint]) -> Result<Self, SeriesError> {
        if indicators.len() != prices.len() {
            return Err(SeriesError::LengthMismatch {
                indicators: indicators.len(),
                prices: prices.len(),
            });
        }
        if indicators.is_empty() {
            return Err(SeriesError::Empty);
        }

        let mut bars = Vec::with_capacity(indicators.len());
        for (index, (ind, px)) in indicators.iter().zip(prices).enumerate() {
            if ind.date != px.date {
                return Err(SeriesError::DateMismatch {
                    index,
                    indicator: ind.date,
                    price: px.date,
                });
            }
            if let Some(prev) = bars.last().map(|b: &DailyBar| b.date) {
                if ind.date <= prev {
                    return Err(SeriesError::NotIncreasing { index, date: ind.date });
                }
            }
            if !ind.diff.is_finite() {
                return Err(SeriesError::NonFiniteDiff { date: ind.date });
            }
            if !px.close.is_finite() || px.close <= 0.0 {
                return Err(SeriesError::InvalidClose {
                    date: px.date,
                    close: px.close,
                });
            }
            bars.push(DailyBar {
                date: ind.date,
                diff: ind.diff,
                close: px.close,
            });
        }

        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// DIF values in date order
    pub fn diffs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.diff).collect()
    }

    /// Final bar of the series. Construction guarantees at least one.
    pub fn last(&self) -> &DailyBar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.last().date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(n as u64)
    }

    fn series(n: u32) -> (Vec<IndicatorPoint>, Vec<PricePoint>) {
        let ind = (0..n).map(|i| IndicatorPoint::new(day(i), i as f64 * 0.1)).collect();
        let px = (0..n).map(|i| PricePoint::new(day(i), 10.0 + i as f64)).collect();
        (ind, px)
    }

    #[test]
    fn test_aligned_series_zips_bars() {
        let (ind, px) = series(3);
        let aligned = AlignedSeries::new(&ind, &px).unwrap();
        assert_eq!(aligned.len(), 3);
        assert_eq!(aligned.bars()[2].close, 12.0);
        assert_eq!(aligned.first_date(), day(0));
        assert_eq!(aligned.last_date(), day(2));
        assert_eq!(aligned.last().close, 12.0);
        assert_eq!(aligned.diffs().len(), 3);
    }

    #[test]
    fn test_empty_series_rejected() {
        assert_eq!(AlignedSeries::new(&[], &[]), Err(SeriesError::Empty));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let (ind, mut px) = series(4);
        px.pop();
        assert_eq!(
            AlignedSeries::new(&ind, &px),
            Err(SeriesError::LengthMismatch { indicators: 4, prices: 3 })
        );
    }

    #[test]
    fn test_date_mismatch_rejected() {
        let (ind, mut px) = series(3);
        px[1].date = day(10);
        assert!(matches!(
            AlignedSeries::new(&ind, &px),
            Err(SeriesError::DateMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn test_duplicate_date_rejected() {
        let (mut ind, mut px) = series(3);
        ind[2].date = day(1);
        px[2].date = day(1);
        assert!(matches!(
            AlignedSeries::new(&ind, &px),
            Err(SeriesError::NotIncreasing { index: 2, .. })
        ));
    }

    #[test]
    fn test_bad_values_rejected() {
        let (mut ind, px) = series(3);
        ind[0].diff = f64::NAN;
        assert!(matches!(
            AlignedSeries::new(&ind, &px),
            Err(SeriesError::NonFiniteDiff { .. })
        ));

        let (ind, mut px) = series(3);
        px[1].close = 0.0;
        assert!(matches!(
            AlignedSeries::new(&ind, &px),
            Err(SeriesError::InvalidClose { .. })
        ));
    }
}
