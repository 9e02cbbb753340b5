//! Monotonic clocks

use parking_lot::Mutex;
use std::time::{Duration, Instant};
use strata_core::Clock;

/// Wall-clock backed monotonic time source
///
/// Readings are measured from the moment the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Deterministic clock that advances by a fixed step on every reading
///
/// Lets tests bound busy-waits by a known number of readings instead of
/// real time.
#[derive(Debug)]
pub struct SteppingClock {
    step: Duration,
    current: Mutex<Duration>,
    readings: Mutex<u64>,
}

impl SteppingClock {
    /// Create a clock starting at zero that advances by `step` per reading
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            current: Mutex::new(Duration::ZERO),
            readings: Mutex::new(0),
        }
    }

    /// Number of times `now()` has been called
    pub fn readings(&self) -> u64 {
        *self.readings.lock()
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Duration {
        *self.readings.lock() += 1;
        let mut current = self.current.lock();
        let reading = *current;
        *current += self.step;
        reading
    }
}
