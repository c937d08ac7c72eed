//! JSON File Source
//!
//! Reads previously downloaded market-data API responses from disk. Each file
//! is a JSON array of daily records:
//!
//! - MACD: `{"t": "2024-01-02 00:00:00", "diff": 0.123, ...}`
//! - price: `{"t": "2024-01-02 00:00:00", "c": 10.5, ...}`
//!
//! Extra fields are ignored. A record missing `t` or its value field fails
//! the whole load.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::{IndicatorPoint, PricePoint};
use crate::ports::{DataError, SeriesSource};

#[derive(Debug, Deserialize)]
struct MacdRecord {
    t: String,
    diff: f64,
}

#[derive(Debug, Deserialize)]
struct PriceRecord {
    t: String,
    c: f64,
}

/// Parse an API timestamp; both `2024-01-02 00:00:00` and `2024-01-02` occur.
fn parse_date(index: usize, value: &str) -> Result<NaiveDate, DataError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map_err(|_| DataError::InvalidDate {
            index,
            value: value.to_string(),
        })
}

fn parse_records<T: DeserializeOwned>(origin: &str, content: &str) -> Result<Vec<T>, DataError> {
    serde_json::from_str(content).map_err(|source| DataError::Parse {
        path: origin.to_string(),
        source,
    })
}

/// Parse MACD records into indicator points
pub fn parse_indicators(origin: &str, content: &str) -> Result<Vec<IndicatorPoint>, DataError> {
    parse_records::<MacdRecord>(origin, content)?
        .into_iter()
        .enumerate()
        .map(|(i, r)| -> Result<IndicatorPoint, DataError> {
            Ok(IndicatorPoint::new(parse_date(i, &r.t)?, r.diff))
        })
        .collect()
}

/// Parse price records into close-price points
pub fn parse_prices(origin: &str, content: &str) -> Result<Vec<PricePoint>, DataError> {
    parse_records::<PriceRecord>(origin, content)?
        .into_iter()
        .enumerate()
        .map(|(i, r)| -> Result<PricePoint, DataError> {
            Ok(PricePoint::new(parse_date(i, &r.t)?, r.c))
        })
        .collect()
}

async fn read(path: &Path) -> Result<String, DataError> {
    tokio::fs::read_to_string(path).await.map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Series source backed by two JSON files on disk
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    instrument: String,
    macd_path: PathBuf,
    price_path: PathBuf,
}

impl JsonFileSource {
    pub fn new(
        instrument: impl Into<String>,
        macd_path: impl Into<PathBuf>,
        price_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            macd_path: macd_path.into(),
            price_path: price_path.into(),
        }
    }

    pub fn macd_path(&self) -> &Path {
        &self.macd_path
    }

    pub fn price_path(&self) -> &Path {
        &self.price_path
    }
}

#[async_trait]
impl SeriesSource for JsonFileSource {
    fn instrument(&self) -> String {
        self.instrument.clone()
    }

    async fn load_indicators(&self) -> Result<Vec<IndicatorPoint>, DataError> {
        let content = read(&self.macd_path).await?;
        parse_indicators(&self.macd_path.display().to_string(), &content)
    }

    async fn load_prices(&self) -> Result<Vec<PricePoint>, DataError> {
        let content = read(&self.price_path).await?;
        parse_prices(&self.price_path.display().to_string(), &content)
    }
}
