//! Unit tests for volatility indicators

use crate::common::{flat_series, uptrend_series};
use marketpulse::indicators::volatility;

#[test]
fn atr_pct_on_a_flat_series_is_the_bar_range() {
    // every true range is high - low = 1.0 on a 100.0 close
    let series = flat_series("X", 60);
    let atr = volatility::atr_pct(&series, volatility::ATR_PERIOD).unwrap();
    assert!((atr - 1.0).abs() < 1e-9);
}

#[test]
fn atr_pct_undefined_below_lookback() {
    // period + 1 candles are required for `period` true ranges
    let series = flat_series("X", 14);
    assert!(volatility::atr_pct(&series, volatility::ATR_PERIOD).is_none());
}

#[test]
fn bollinger_bands_are_ordered() {
    let series = uptrend_series("X", 60);
    let (upper, middle, lower) =
        volatility::bollinger_bands(&series, volatility::BOLLINGER_PERIOD).unwrap();
    assert!(upper > middle);
    assert!(middle > lower);
}

#[test]
fn bollinger_position_stays_in_unit_range() {
    let series = uptrend_series("X", 60);
    let pos = volatility::bollinger_position(&series, volatility::BOLLINGER_PERIOD).unwrap();
    assert!((0.0..=1.0).contains(&pos));
    // a steady uptrend closes in the upper half of its bands
    assert!(pos > 0.5);
}

#[test]
fn degenerate_bands_read_mid_position() {
    // zero variance collapses the bands onto the middle line
    let series = flat_series("X", 60);
    let pos = volatility::bollinger_position(&series, volatility::BOLLINGER_PERIOD).unwrap();
    assert_eq!(pos, 0.5);
}

#[test]
fn bollinger_undefined_below_lookback() {
    let series = uptrend_series("X", 19);
    assert!(volatility::bollinger_bands(&series, volatility::BOLLINGER_PERIOD).is_none());
    assert!(volatility::bollinger_position(&series, volatility::BOLLINGER_PERIOD).is_none());
}
