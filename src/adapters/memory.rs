use async_trait::async_trait;

use crate::domain::{IndicatorPoint, PricePoint};
use crate::ports::{DataError, SeriesSource};

/// In-memory series source, for callers that already hold the data
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    instrument: String,
    indicators: Vec<IndicatorPoint>,
    prices: Vec<PricePoint>,
}

impl MemorySource {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            ..Default::default()
        }
    }

    /// Builder method to set the indicator series
    pub fn with_indicators(mut self, indicators: Vec<IndicatorPoint>) -> Self {
        self.indicators = indicators;
        self
    }

    /// Builder method to set the price series
    pub fn with_prices(mut self, prices: Vec<PricePoint>) -> Self {
        self.prices = prices;
        self
    }
}

#[async_trait]
impl SeriesSource for MemorySource {
    fn instrument(&self) -> String {
        self.instrument.clone()
    }

    async fn load_indicators(&self) -> Result<Vec<IndicatorPoint>, DataError> {
        Ok(self.indicators.clone())
    }

    async fn load_prices(&self) -> Result<Vec<PricePoint>, DataError> {
        Ok(self.prices.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeriesError;
    use crate::ports::load_aligned;
    use chrono::NaiveDate;

    #[test]
    fn test_memory_source() {
        let d = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let source = MemorySource::new("399006.SZ")
            .with_indicators(vec![IndicatorPoint::new(d, 1.0)])
            .with_prices(vec![PricePoint::new(d, 2.0)]);

        let series = tokio_test::block_on(load_aligned(&source)).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(source.instrument(), "399006.SZ");
    }

    #[test]
    fn test_empty_memory_source() {
        let source = MemorySource::new("empty");
        let err = tokio_test::block_on(load_aligned(&source)).unwrap_err();
        assert!(matches!(err, DataError::Series(SeriesError::Empty)));
    }
}
