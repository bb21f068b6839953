//! Unit tests for call pacing

use std::time::Duration;
use tokio::time::Instant;

use perpsentry::services::pacing::Pacer;

#[tokio::test(start_paused = true)]
async fn test_pacer_spaces_calls() {
    let pacer = Pacer::new(Duration::from_millis(250));
    let start = Instant::now();

    pacer.acquire().await;
    pacer.acquire().await;
    pacer.acquire().await;

    assert!(start.elapsed() >= Duration::from_millis(500));
    assert!(start.elapsed() < Duration::from_millis(750));
}

#[tokio::test(start_paused = true)]
async fn test_disabled_pacer_never_waits() {
    let pacer = Pacer::disabled();
    let start = Instant::now();
    for _ in 0..10 {
        pacer.acquire().await;
    }
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_pacer_does_not_wait_after_idle_gap() {
    let pacer = Pacer::default();
    assert_eq!(pacer.spacing(), Duration::from_millis(250));

    pacer.acquire().await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    let before = Instant::now();
    pacer.acquire().await;
    assert_eq!(before.elapsed(), Duration::ZERO);
}
