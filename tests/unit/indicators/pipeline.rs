//! Unit tests for the indicator pipeline

use perpsentry::indicators::{IndicatorError, IndicatorPeriods, IndicatorPipeline};
use perpsentry::models::indicators::CandleSeries;
use perpsentry::models::instrument::Timeframe;

use crate::test_utils::{rising_candles, zigzag_uptrend};

#[test]
fn test_default_min_history() {
    assert_eq!(IndicatorPeriods::default().min_history(), 50);

    let periods = IndicatorPeriods {
        adx: 30,
        ..IndicatorPeriods::default()
    };
    assert_eq!(periods.min_history(), 60);
}

#[test]
fn test_periods_validation() {
    assert!(IndicatorPeriods::default().validate().is_ok());

    let inverted = IndicatorPeriods {
        ema_fast: 50,
        ema_slow: 20,
        ..IndicatorPeriods::default()
    };
    assert!(matches!(
        inverted.validate(),
        Err(IndicatorError::InvalidParameter(_))
    ));

    let zero = IndicatorPeriods {
        rsi: 0,
        ..IndicatorPeriods::default()
    };
    assert!(zero.validate().is_err());
}

#[test]
fn test_pipeline_insufficient_data() {
    let series = CandleSeries::new("BTC", Timeframe::M15, rising_candles(49, 100.0, 1.0));
    let err = IndicatorPipeline::default().compute(&series).unwrap_err();
    assert_eq!(
        err,
        IndicatorError::InsufficientData {
            required: 50,
            available: 49
        }
    );
}

#[test]
fn test_pipeline_snapshot_from_uptrend() {
    let candles = zigzag_uptrend(120);
    let last = candles.last().unwrap().clone();
    let series = CandleSeries::new("BTC", Timeframe::M15, candles);

    let snapshot = IndicatorPipeline::default().compute(&series).unwrap();
    assert_eq!(snapshot.timeframe, Timeframe::M15);
    assert_eq!(snapshot.price, last.close);
    assert_eq!(snapshot.timestamp, last.timestamp);
    assert!(snapshot.ema_fast > snapshot.ema_slow);
    assert!(snapshot.momentum > 50.0 && snapshot.momentum < 70.0);
    assert!(snapshot.trend_strength > 20.0);
    assert!(snapshot.volatility > 0.0);
    assert!((snapshot.volume_ratio - 1.0).abs() < 1e-9);
    assert!(snapshot.bands.is_some());
}

#[test]
fn test_pipeline_is_deterministic() {
    let series = CandleSeries::new("ETH", Timeframe::H1, zigzag_uptrend(90));
    let pipeline = IndicatorPipeline::default();
    assert_eq!(
        pipeline.compute(&series).unwrap(),
        pipeline.compute(&series).unwrap()
    );
}

#[test]
fn test_pipeline_without_bands() {
    let pipeline = IndicatorPipeline::new(IndicatorPeriods {
        bands: None,
        ..IndicatorPeriods::default()
    });
    let series = CandleSeries::new("BTC", Timeframe::M15, zigzag_uptrend(60));
    assert!(pipeline.compute(&series).unwrap().bands.is_none());
}
