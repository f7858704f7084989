//! Sample timing for blocks and for the loop that drives ticks.
//!
//! Stateful blocks are built for one sample period; the driving loop counts
//! ticks against the same period to know the time of each sample.

use sf_core::{Frequency, Time, hertz, seconds};

use crate::error::FlowResult;

/// Sample configuration for a block or a driving loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleConfig {
    /// Sample period in seconds.
    pub dt: f64,
}

impl SampleConfig {
    /// Create a sample configuration from a period in seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if `dt` is not a positive finite number.
    pub fn new(dt: f64) -> FlowResult<Self> {
        let dt = sf_core::ensure_positive(dt, "sample period")?;
        Ok(Self { dt })
    }

    /// Create a sample configuration from frequency in Hz.
    pub fn from_frequency(freq_hz: f64) -> FlowResult<Self> {
        let freq_hz = sf_core::ensure_positive(freq_hz, "sample frequency")?;
        Ok(Self { dt: 1.0 / freq_hz })
    }

    /// Create a sample configuration from a period quantity.
    pub fn from_period(period: Time) -> FlowResult<Self> {
        Self::new(seconds(period))
    }

    /// Create a sample configuration from a rate quantity.
    pub fn from_rate(rate: Frequency) -> FlowResult<Self> {
        Self::from_frequency(hertz(rate))
    }

    /// Get the sample frequency in Hz.
    pub fn frequency(&self) -> f64 {
        1.0 / self.dt
    }
}

/// Sample clock counts ticks and reports the time of the current sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleClock {
    /// Sample configuration.
    pub config: SampleConfig,
    /// Time of the first sample.
    pub start_time: f64,
    /// Ticks completed since start.
    pub ticks: u64,
}

impl SampleClock {
    /// Create a new sample clock starting at `start_time`.
    pub fn new(config: SampleConfig, start_time: f64) -> Self {
        Self {
            config,
            start_time,
            ticks: 0,
        }
    }

    /// Time of the current sample.
    ///
    /// Computed from the tick count rather than accumulated, so long runs
    /// do not drift.
    pub fn time(&self) -> f64 {
        self.start_time + self.ticks as f64 * self.config.dt
    }

    /// Advance to the next sample.
    pub fn advance(&mut self) {
        self.ticks += 1;
    }

    /// Reset the clock to a new start time.
    pub fn reset(&mut self, start_time: f64) {
        self.start_time = start_time;
        self.ticks = 0;
    }
}
