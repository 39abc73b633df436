//! Market data provider interface for the data-acquisition collaborator.

use crate::error::ProviderError;
use crate::models::AssetSeries;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the series snapshot for a symbol as of a date.
    async fn fetch_series(&self, symbol: &str, as_of: NaiveDate)
        -> Result<AssetSeries, ProviderError>;
}
