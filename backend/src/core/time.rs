//! Continuous simulation clock
//!
//! The simulation advances in jumps from one event time to the next. The
//! clock only ever moves forward.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attempt to move the clock to an earlier time
#[derive(Debug, Error, PartialEq)]
#[error("Clock cannot move backwards: now {now}, requested {requested}")]
pub struct ClockError {
    pub now: f64,
    pub requested: f64,
}

/// Monotonically non-decreasing simulation time
///
/// # Example
/// ```
/// use queue_simulator_core_rs::SimClock;
///
/// let mut clock = SimClock::new();
/// assert_eq!(clock.now(), 0.0);
///
/// clock.advance_to(1.5).unwrap();
/// assert_eq!(clock.now(), 1.5);
/// assert!(clock.advance_to(1.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    now: f64,
}

impl SimClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self { now: 0.0 }
    }

    /// Current simulation time
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Jump to `time`, which must not be earlier than the current time
    pub fn advance_to(&mut self, time: f64) -> Result<(), ClockError> {
        if time < self.now || time.is_nan() {
            return Err(ClockError {
                now: self.now,
                requested: time,
            });
        }
        self.now = time;
        Ok(())
    }
}
