//! Trend indicators: moving-average levels and alignment

use crate::indicators::math;
use crate::models::AssetSeries;

pub const SMA_SHORT: usize = 20;
pub const SMA_MEDIUM: usize = 50;
pub const SMA_LONG: usize = 200;

/// SMA of the close over `period`, undefined below the lookback.
pub fn sma_close(series: &AssetSeries, period: usize) -> Option<f64> {
    math::sma(&series.closes(), period)
}

/// Moving-average alignment signal in [-1, 1].
///
/// Each defined average contributes +1 when price trades above it and -1
/// below, averaged over the defined ones. At least the short average must
/// be defined; with fewer than `SMA_SHORT` bars the signal is undefined.
pub fn alignment_signal(series: &AssetSeries) -> Option<f64> {
    let price = series.last_close()?;
    let mut signals = Vec::new();
    for period in [SMA_SHORT, SMA_MEDIUM, SMA_LONG] {
        if let Some(avg) = sma_close(series, period) {
            signals.push(if price > avg { 1.0 } else { -1.0 });
        }
    }
    if signals.is_empty() {
        return None;
    }
    Some(signals.iter().sum::<f64>() / signals.len() as f64)
}
