//! Momentum indicators: RSI, MACD histogram, stochastic %K

use crate::indicators::math;
use crate::models::AssetSeries;

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const STOCH_PERIOD: usize = 14;

/// RSI over the trailing `period` changes.
///
/// RSI = 100 - 100 / (1 + avg_gain / avg_loss). All-gain windows pin at 100.
pub fn rsi(series: &AssetSeries, period: usize) -> Option<f64> {
    let closes = series.closes();
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let window = &changes[changes.len() - period..];
    let avg_gain: f64 = window.iter().filter(|c| **c > 0.0).sum::<f64>() / period as f64;
    let avg_loss: f64 = window
        .iter()
        .filter(|c| **c < 0.0)
        .map(|c| c.abs())
        .sum::<f64>()
        / period as f64;
    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// MACD histogram (MACD line minus its signal line) for the last bar.
pub fn macd_histogram(series: &AssetSeries) -> Option<f64> {
    let closes = series.closes();
    let fast = math::ema_series(&closes, MACD_FAST)?;
    let slow = math::ema_series(&closes, MACD_SLOW)?;
    // Align the fast series to the slow warm-up before differencing.
    let offset = fast.len().checked_sub(slow.len())?;
    let macd_line: Vec<f64> = slow
        .iter()
        .enumerate()
        .map(|(i, s)| fast[offset + i] - s)
        .collect();
    let signal = math::ema_series(&macd_line, MACD_SIGNAL)?;
    Some(macd_line.last()? - signal.last()?)
}

/// Stochastic %K over the trailing `period` bars.
pub fn stochastic_k(series: &AssetSeries, period: usize) -> Option<f64> {
    if period == 0 || series.candles.len() < period {
        return None;
    }
    let window = &series.candles[series.candles.len() - period..];
    let high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let close = series.last_close()?;
    if high == low {
        return Some(50.0);
    }
    Some((close - low) / (high - low) * 100.0)
}
