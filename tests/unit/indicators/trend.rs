//! Unit tests for trend indicators

use crate::common::{downtrend_series, uptrend_series};
use marketpulse::indicators::trend;

#[test]
fn sma_requires_full_lookback() {
    let series = uptrend_series("X", 19);
    assert!(trend::sma_close(&series, 20).is_none());
    let series = uptrend_series("X", 20);
    assert!(trend::sma_close(&series, 20).is_some());
}

#[test]
fn sma_is_the_window_mean() {
    let series = uptrend_series("X", 250);
    let sma = trend::sma_close(&series, 20).unwrap();
    let closes = series.closes();
    let expected: f64 = closes[closes.len() - 20..].iter().sum::<f64>() / 20.0;
    assert!((sma - expected).abs() < 1e-9);
}

#[test]
fn alignment_is_positive_in_an_uptrend() {
    let series = uptrend_series("X", 250);
    let signal = trend::alignment_signal(&series).unwrap();
    assert_eq!(signal, 1.0);
}

#[test]
fn alignment_is_negative_in_a_downtrend() {
    let series = downtrend_series("X", 250);
    let signal = trend::alignment_signal(&series).unwrap();
    assert_eq!(signal, -1.0);
}

#[test]
fn alignment_uses_partial_averages_on_medium_history() {
    // 60 bars: SMA20 and SMA50 defined, SMA200 not.
    let series = uptrend_series("X", 60);
    let signal = trend::alignment_signal(&series).unwrap();
    assert_eq!(signal, 1.0);
}

#[test]
fn alignment_undefined_below_short_lookback() {
    let series = uptrend_series("X", 10);
    assert!(trend::alignment_signal(&series).is_none());
}
