//! Pattern indicators: support/resistance structure from key levels

use crate::indicators::{trend, volatility};
use crate::models::AssetSeries;

/// Support/resistance balance signal in [-1, 1].
///
/// The key levels are the three moving averages plus the Bollinger bands.
/// Each defined level below price counts as support (+1), above price as
/// resistance (-1); the signal is the mean. A price sitting above all of
/// its key levels reads +1, below all of them -1.
pub fn level_balance_signal(series: &AssetSeries) -> Option<f64> {
    let price = series.last_close()?;
    let mut levels: Vec<f64> = Vec::new();
    for period in [trend::SMA_SHORT, trend::SMA_MEDIUM, trend::SMA_LONG] {
        if let Some(l) = trend::sma_close(series, period) {
            levels.push(l);
        }
    }
    if let Some((upper, _, lower)) =
        volatility::bollinger_bands(series, volatility::BOLLINGER_PERIOD)
    {
        levels.push(upper);
        levels.push(lower);
    }
    if levels.is_empty() {
        return None;
    }
    let balance: f64 = levels
        .iter()
        .map(|l| if price > *l { 1.0 } else { -1.0 })
        .sum();
    Some(balance / levels.len() as f64)
}
