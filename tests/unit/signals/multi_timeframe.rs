//! Unit tests for weighted multi-timeframe scoring

use perpsentry::models::instrument::Timeframe;
use perpsentry::models::signal::{SignalDirection, TrendBucket};
use perpsentry::signals::{
    bucket_for, combine, timeframe_score, ClassifierThresholds, SnapshotsByTimeframe,
    TimeframeWeights,
};

use crate::test_utils::snapshot;

#[test]
fn test_weight_table_sums_to_one() {
    assert!(TimeframeWeights::verify());
}

#[test]
fn test_normalized_weights() {
    let weights = TimeframeWeights::normalized(&[Timeframe::M15, Timeframe::H1, Timeframe::M15]);
    assert_eq!(weights.len(), 2);
    let total: f64 = weights.iter().map(|(_, w)| w).sum();
    assert!((total - 1.0).abs() < 1e-12);
    assert!((weights[0].1 - 0.15 / 0.35).abs() < 1e-12);
}

#[test]
fn test_timeframe_score_components() {
    let thresholds = ClassifierThresholds::default();

    let full_long = snapshot(Timeframe::H1, 105.0, 100.0, 60.0, 30.0);
    assert!((timeframe_score(&full_long, &thresholds) - 1.0).abs() < 1e-12);

    let full_short = snapshot(Timeframe::H1, 95.0, 100.0, 40.0, 30.0);
    assert!((timeframe_score(&full_short, &thresholds) + 1.0).abs() < 1e-12);

    // crossover up, momentum in the short band, weak trend
    let mixed = snapshot(Timeframe::H1, 105.0, 100.0, 45.0, 10.0);
    assert!((timeframe_score(&mixed, &thresholds) - 0.1).abs() < 1e-12);
}

#[test]
fn test_combine_buckets() {
    let thresholds = ClassifierThresholds::default();
    let timeframes = [Timeframe::M15, Timeframe::H1];

    let mut snapshots = SnapshotsByTimeframe::new();
    snapshots.insert(
        Timeframe::M15,
        snapshot(Timeframe::M15, 105.0, 100.0, 60.0, 30.0),
    );
    snapshots.insert(
        Timeframe::H1,
        snapshot(Timeframe::H1, 105.0, 100.0, 45.0, 10.0),
    );

    let combined = combine(&timeframes, &snapshots, &thresholds).unwrap();
    let expected = 0.15 / 0.35 + 0.20 / 0.35 * 0.1;
    assert!((combined.score - expected).abs() < 1e-12);
    assert_eq!(combined.bucket, TrendBucket::Bullish);
    assert!(combined.bucket.confirms(SignalDirection::Long));
    assert!(!combined.bucket.confirms(SignalDirection::Short));
    assert_eq!(combined.contributions.len(), 2);
}

#[test]
fn test_combine_requires_every_timeframe() {
    let mut snapshots = SnapshotsByTimeframe::new();
    snapshots.insert(
        Timeframe::M15,
        snapshot(Timeframe::M15, 105.0, 100.0, 60.0, 30.0),
    );
    assert!(combine(
        &[Timeframe::M15, Timeframe::H4],
        &snapshots,
        &ClassifierThresholds::default()
    )
    .is_none());
    assert!(combine(&[], &snapshots, &ClassifierThresholds::default()).is_none());
}

#[test]
fn test_bucket_boundaries() {
    assert_eq!(bucket_for(0.6), TrendBucket::StrongBullish);
    assert_eq!(bucket_for(0.2), TrendBucket::Bullish);
    assert_eq!(bucket_for(0.19), TrendBucket::Neutral);
    assert_eq!(bucket_for(-0.2), TrendBucket::Bearish);
    assert_eq!(bucket_for(-0.6), TrendBucket::StrongBearish);
}
