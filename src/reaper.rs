//! Periodic stale-room sweep
//!
//! The reaper only decides *when* to sweep. The actor awaits `tick()` in
//! its select loop and runs `MatchCore::reap` with `max_age()` on its own
//! thread of control, so a sweep never interleaves with another command.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

#[derive(Debug)]
pub struct ReaperTask {
    interval: Interval,
    max_age: Duration,
}

impl ReaperTask {
    /// Sweep every `period`, first one `period` from now
    pub fn new(period: Duration, max_age: Duration) -> Self {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, max_age }
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    /// Wait for the next sweep. Cancel safe.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }
}
