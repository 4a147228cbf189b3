//! Millisecond time sources for the generator loop

use std::cell::Cell;
use std::time::{Duration, Instant};

pub trait Clock {
    /// Milliseconds since the clock started
    fn now_ms(&self) -> u64;

    /// Give up the CPU between loop iterations
    fn idle(&self);
}

/// Wall-clock time since construction, like the board's uptime counter
pub struct SystemClock {
    start: Instant,
    idle: Duration,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            idle: Duration::from_millis(1),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn idle(&self) {
        std::thread::sleep(self.idle);
    }
}

/// Simulated clock that advances a fixed step on every idle
pub struct ManualClock {
    now: Cell<u64>,
    step: u64,
}

impl ManualClock {
    pub fn new(step: u64) -> Self {
        Self {
            now: Cell::new(0),
            step,
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn idle(&self) {
        self.advance(self.step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_steps() {
        let clock = ManualClock::new(25);
        assert_eq!(clock.now_ms(), 0);
        clock.idle();
        clock.idle();
        assert_eq!(clock.now_ms(), 50);
        clock.advance(1_000);
        assert_eq!(clock.now_ms(), 1_050);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now_ms();
        clock.idle();
        assert!(clock.now_ms() >= first);
    }
}
