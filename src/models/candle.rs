use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily price/volume bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Immutable-for-the-run snapshot of one symbol's bars, chronological.
///
/// Gap handling is the data provider's responsibility; consumers assume the
/// series is ordered and gap-free.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetSeries {
    pub symbol: String,
    pub as_of: NaiveDate,
    pub candles: Vec<Candle>,
}

impl AssetSeries {
    pub fn new(symbol: impl Into<String>, as_of: NaiveDate, candles: Vec<Candle>) -> Self {
        Self {
            symbol: symbol.into(),
            as_of,
            candles,
        }
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Chronological order check used by the data-update job before a series
    /// is accepted into the store.
    pub fn is_chronological(&self) -> bool {
        self.candles.windows(2).all(|w| w[0].date < w[1].date)
    }
}
