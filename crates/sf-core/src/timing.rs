//! Lightweight wall-clock timing for ticks.
//!
//! A real-time loop has to know whether one pass through the graph fit in the
//! sample interval. `Timer` measures one pass, `TickBudget` decides whether it
//! overran.

use std::time::{Duration, Instant};

/// A simple timer that measures elapsed time.
#[derive(Debug)]
pub struct Timer {
    label: &'static str,
    start: Instant,
}

impl Timer {
    /// Create and start a new timer with the given label.
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Stop the timer and return the elapsed time.
    pub fn stop(self) -> Duration {
        self.start.elapsed()
    }
}

/// Wall-clock allowance for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickBudget {
    pub limit: Duration,
}

impl TickBudget {
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }

    /// How far past the limit `elapsed` went, if at all.
    pub fn overrun(&self, elapsed: Duration) -> Option<Duration> {
        elapsed.checked_sub(self.limit).filter(|d| !d.is_zero())
    }
}

/// Running totals over many ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickStats {
    /// Completed ticks.
    pub ticks: u64,
    /// Ticks that ran longer than the budget.
    pub overruns: u64,
    /// Ticks that returned an error.
    pub failures: u64,
    /// Duration of the most recent tick.
    pub last: Duration,
    /// Longest tick seen.
    pub worst: Duration,
}

impl TickStats {
    pub fn record(&mut self, elapsed: Duration, overran: bool) {
        self.ticks += 1;
        if overran {
            self.overruns += 1;
        }
        self.last = elapsed;
        self.worst = self.worst.max(elapsed);
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }
}
