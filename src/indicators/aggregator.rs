//! Indicator aggregation: one series in, one vector out

use crate::indicators::{momentum, pattern, trend, volatility, volume};
use crate::models::{AssetSeries, Category, IndicatorVector};

/// Compute the full indicator vector for one asset series.
///
/// Total and deterministic: an indicator whose lookback exceeds the series
/// length lands in the vector as an explicit undefined entry, it never
/// aborts the computation.
pub fn aggregate(series: &AssetSeries) -> IndicatorVector {
    let mut vector = IndicatorVector::default();

    vector.insert(
        Category::Trend,
        "sma_20",
        trend::sma_close(series, trend::SMA_SHORT),
    );
    vector.insert(
        Category::Trend,
        "sma_50",
        trend::sma_close(series, trend::SMA_MEDIUM),
    );
    vector.insert(
        Category::Trend,
        "sma_200",
        trend::sma_close(series, trend::SMA_LONG),
    );
    vector.insert(Category::Trend, "ma_alignment", trend::alignment_signal(series));

    vector.insert(
        Category::Momentum,
        "rsi_14",
        momentum::rsi(series, momentum::RSI_PERIOD),
    );
    vector.insert(
        Category::Momentum,
        "macd_histogram",
        momentum::macd_histogram(series),
    );
    vector.insert(
        Category::Momentum,
        "stoch_k",
        momentum::stochastic_k(series, momentum::STOCH_PERIOD),
    );

    vector.insert(
        Category::Volatility,
        "atr_pct",
        volatility::atr_pct(series, volatility::ATR_PERIOD),
    );
    vector.insert(
        Category::Volatility,
        "bollinger_position",
        volatility::bollinger_position(series, volatility::BOLLINGER_PERIOD),
    );

    vector.insert(
        Category::Volume,
        "volume_ratio",
        volume::volume_ratio(series, volume::VOLUME_SMA_PERIOD),
    );

    vector.insert(
        Category::Pattern,
        "level_balance",
        pattern::level_balance_signal(series),
    );

    vector
}
