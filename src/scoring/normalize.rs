//! Per-category signal extraction and sub-score normalization
//!
//! Each category maps its indicator entries to a signal in [-1, +1]
//! (-1 bearish, +1 bullish), then the signal is linearly rescaled to a
//! [0, 10] sub-score. A category with no defined indicator yields an
//! undefined sub-score rather than a neutral one.

use crate::indicators::math::clamp_signal;
use crate::models::{Category, IndicatorVector};
use serde::{Deserialize, Serialize};

/// Tunable normalization parameters. The curve is configuration, not law;
/// the defaults reproduce the documented worked examples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Signals are clipped to [-clip, clip] before rescaling.
    pub signal_clip: f64,
    /// ATR percentage treated as fully turbulent (signal -1).
    pub atr_full_scale_pct: f64,
    /// Volume ratio band considered healthy participation.
    pub volume_healthy_low: f64,
    pub volume_healthy_high: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            signal_clip: 1.0,
            atr_full_scale_pct: 10.0,
            volume_healthy_low: 0.8,
            volume_healthy_high: 2.0,
        }
    }
}

/// Rescale a [-1, 1] signal to a [0, 10] sub-score, clipping first.
pub fn rescale(signal: f64, config: &ScoringConfig) -> f64 {
    let clipped = clamp_signal(signal, config.signal_clip);
    5.0 + 5.0 * clipped / config.signal_clip
}

fn entry(vector: &IndicatorVector, category: Category, name: &str) -> Option<f64> {
    vector.category(category)?.get(name).copied().flatten()
}

/// Trend signal: the moving-average alignment value as computed by the
/// aggregator, already in [-1, 1].
pub fn trend_signal(vector: &IndicatorVector) -> Option<f64> {
    entry(vector, Category::Trend, "ma_alignment")
}

/// Momentum signal: mean of the defined oscillator readings, each centered
/// so that 0 is neutral. MACD contributes only its histogram sign.
pub fn momentum_signal(vector: &IndicatorVector) -> Option<f64> {
    let mut parts = Vec::new();
    if let Some(rsi) = entry(vector, Category::Momentum, "rsi_14") {
        parts.push((rsi - 50.0) / 50.0);
    }
    if let Some(hist) = entry(vector, Category::Momentum, "macd_histogram") {
        parts.push(if hist > 0.0 {
            1.0
        } else if hist < 0.0 {
            -1.0
        } else {
            0.0
        });
    }
    if let Some(k) = entry(vector, Category::Momentum, "stoch_k") {
        parts.push((k - 50.0) / 50.0);
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.iter().sum::<f64>() / parts.len() as f64)
}

/// Volatility signal: calmness. Low ATR and a close near the middle of the
/// Bollinger bands both read bullish for health.
pub fn volatility_signal(vector: &IndicatorVector, config: &ScoringConfig) -> Option<f64> {
    let mut parts = Vec::new();
    if let Some(atr_pct) = entry(vector, Category::Volatility, "atr_pct") {
        let turbulence = (atr_pct / config.atr_full_scale_pct).clamp(0.0, 1.0);
        parts.push(1.0 - 2.0 * turbulence);
    }
    if let Some(pos) = entry(vector, Category::Volatility, "bollinger_position") {
        // 0.5 is mid-band; either extreme reads -1.
        parts.push(1.0 - 2.0 * (2.0 * pos - 1.0).abs());
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.iter().sum::<f64>() / parts.len() as f64)
}

/// Volume signal: +1 at the center of the healthy participation band,
/// falling off linearly to the band edges and below -1 outside it.
pub fn volume_signal(vector: &IndicatorVector, config: &ScoringConfig) -> Option<f64> {
    let ratio = entry(vector, Category::Volume, "volume_ratio")?;
    let center = (config.volume_healthy_low + config.volume_healthy_high) / 2.0;
    let half_band = (config.volume_healthy_high - config.volume_healthy_low) / 2.0;
    if half_band <= 0.0 {
        return None;
    }
    Some((1.0 - (ratio - center).abs() / half_band).max(-1.0))
}

/// Pattern signal: the support/resistance level balance, already in [-1, 1].
pub fn pattern_signal(vector: &IndicatorVector) -> Option<f64> {
    entry(vector, Category::Pattern, "level_balance")
}

/// Sub-score for one category, undefined when its signal is undefined.
pub fn category_score(
    vector: &IndicatorVector,
    category: Category,
    config: &ScoringConfig,
) -> Option<f64> {
    let signal = match category {
        Category::Trend => trend_signal(vector),
        Category::Momentum => momentum_signal(vector),
        Category::Volatility => volatility_signal(vector, config),
        Category::Volume => volume_signal(vector, config),
        Category::Pattern => pattern_signal(vector),
    }?;
    Some(rescale(signal, config))
}
