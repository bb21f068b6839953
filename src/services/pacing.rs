//! Minimum spacing between outbound calls

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Shared by every outbound call of a pass. Each `acquire` returns no sooner
/// than `spacing` after the previous one.
#[derive(Debug)]
pub struct Pacer {
    spacing: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            next_slot: Mutex::new(None),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn spacing(&self) -> Duration {
        self.spacing
    }

    pub async fn acquire(&self) {
        if self.spacing.is_zero() {
            return;
        }

        // lock held across the wait so callers queue in order
        let mut next_slot = self.next_slot.lock().await;
        if let Some(slot) = *next_slot {
            if slot > Instant::now() {
                sleep_until(slot).await;
            }
        }
        *next_slot = Some(Instant::now() + self.spacing);
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}
