//! Volatility indicators: ATR and Bollinger bands

use crate::indicators::math;
use crate::models::AssetSeries;

pub const ATR_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_WIDTH: f64 = 2.0;

/// ATR as a percentage of the last close.
pub fn atr_pct(series: &AssetSeries, period: usize) -> Option<f64> {
    if period == 0 || series.candles.len() < period + 1 {
        return None;
    }
    let trs: Vec<f64> = series
        .candles
        .windows(2)
        .map(|w| math::true_range(w[1].high, w[1].low, w[0].close))
        .collect();
    let atr = math::sma(&trs, period)?;
    let price = series.last_close()?;
    if price == 0.0 {
        return None;
    }
    Some(atr / price * 100.0)
}

/// Bollinger band levels (upper, middle, lower) over `period` closes.
pub fn bollinger_bands(series: &AssetSeries, period: usize) -> Option<(f64, f64, f64)> {
    let closes = series.closes();
    let middle = math::sma(&closes, period)?;
    let window = &closes[closes.len() - period..];
    let variance =
        window.iter().map(|c| (c - middle).powi(2)).sum::<f64>() / period as f64;
    let dev = variance.sqrt() * BOLLINGER_WIDTH;
    Some((middle + dev, middle, middle - dev))
}

/// Position of the close within the Bollinger bands, 0 at the lower band
/// and 1 at the upper. Values outside the bands clamp to the range.
pub fn bollinger_position(series: &AssetSeries, period: usize) -> Option<f64> {
    let (upper, _, lower) = bollinger_bands(series, period)?;
    let price = series.last_close()?;
    if upper == lower {
        return Some(0.5);
    }
    Some(((price - lower) / (upper - lower)).clamp(0.0, 1.0))
}
