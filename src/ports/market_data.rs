use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{AlignedSeries, IndicatorPoint, PricePoint, SeriesError};

/// Data ingestion error type
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed records in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid date '{value}' at record {index}")]
    InvalidDate { index: usize, value: String },

    #[error("Inconsistent series: {0}")]
    Series(#[from] SeriesError),
}

/// Provider of the daily DIF and close-price series for one instrument.
///
/// Implementations hand back clean, date-ascending points; anything they
/// can't parse is an error, never a silently dropped day.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Instrument code, for logging
    fn instrument(&self) -> String;

    /// MACD DIF series
    async fn load_indicators(&self) -> Result<Vec<IndicatorPoint>, DataError>;

    /// Daily closing prices
    async fn load_prices(&self) -> Result<Vec<PricePoint>, DataError>;
}

/// Load both series from `source` and align them.
pub async fn load_aligned(source: &dyn SeriesSource) -> Result<AlignedSeries, DataError> {
    let indicators = source.load_indicators().await?;
    let prices = source.load_prices().await?;
    tracing::info!(
        "Loaded {}: {} indicator points, {} price points",
        source.instrument(),
        indicators.len(),
        prices.len()
    );
    Ok(AlignedSeries::new(&indicators, &prices)?)
}
