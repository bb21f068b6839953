//! Unit tests for EMA indicator

use perpsentry::indicators::trend::{calculate_ema, calculate_ema_pair};

use crate::test_utils::{candles_from_closes, rising_candles};

#[test]
fn test_ema_insufficient_data() {
    let candles = rising_candles(10, 100.0, 0.1);
    assert!(calculate_ema(&candles, 20).is_none());
    assert!(calculate_ema(&candles, 0).is_none());
}

#[test]
fn test_ema_sufficient_data() {
    let candles = rising_candles(50, 100.0, 0.1);
    let ema = calculate_ema(&candles, 12).unwrap();
    assert_eq!(ema.period, 12);
    assert!(ema.value.is_finite());
    // lags a rising series
    assert!(ema.value < candles.last().unwrap().close);
}

#[test]
fn test_ema_exact_period_equals_sma() {
    let candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0]);
    let ema = calculate_ema(&candles, 4).unwrap();
    assert!((ema.value - 2.5).abs() < 1e-12);
}

#[test]
fn test_ema_pair_needs_slow_history() {
    let candles = rising_candles(30, 100.0, 0.1);
    assert!(calculate_ema_pair(&candles, 12, 50).is_none());
    assert!(calculate_ema_pair(&candles, 0, 26).is_none());

    let pair = calculate_ema_pair(&candles, 12, 26).unwrap();
    assert_eq!(pair.fast.period, 12);
    assert_eq!(pair.slow.period, 26);
    assert_eq!(pair.fast.value, calculate_ema(&candles, 12).unwrap().value);
}

#[test]
fn test_ema_crossover() {
    let up = rising_candles(60, 100.0, 0.5);
    assert_eq!(calculate_ema_pair(&up, 12, 26).unwrap().crossover(), 1);

    let down = rising_candles(60, 100.0, -0.5);
    assert_eq!(calculate_ema_pair(&down, 12, 26).unwrap().crossover(), -1);

    let flat = rising_candles(60, 0.0, 0.0);
    assert_eq!(calculate_ema_pair(&flat, 12, 26).unwrap().crossover(), 0);
}
