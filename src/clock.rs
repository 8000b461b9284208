//! Time source used for room ages and message timestamps

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

pub trait Clock: Send {
    /// Monotonic now, for ages
    fn now(&self) -> Instant;

    /// Wall clock in milliseconds since the unix epoch, for timestamps
    fn unix_millis(&self) -> u64;
}

/// Real time; follows tokio's clock so paused-time tests apply
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Manually advanced clock
///
/// Clones share the same offset, so a test can keep one handle and
/// give another to the server.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset_ms: Arc<AtomicU64>,
}

impl ManualClock {
    /// Arbitrary fixed epoch reported by `unix_millis` at offset zero
    pub const EPOCH_MILLIS: u64 = 1_700_000_000_000;

    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_ms.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    fn offset(&self) -> u64 {
        self.offset_ms.load(Ordering::SeqCst)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset())
    }

    fn unix_millis(&self) -> u64 {
        Self::EPOCH_MILLIS + self.offset()
    }
}
