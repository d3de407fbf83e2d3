//! Simulation State
//!
//! The mutable world of one run: the clock, the number of customers in the
//! system, and the FIFO record of arrival timestamps that have not yet been
//! matched by a departure.
//!
//! # Critical Invariants
//!
//! 1. **Count Consistency**: `customers() == pending_arrivals().len()`
//! 2. **Monotonic Clock**: the clock never moves backwards
//! 3. **FIFO Matching**: departures consume arrival timestamps oldest first

use crate::core::time::{ClockError, SimClock};
use crate::orchestrator::SimulationError;
use std::collections::VecDeque;

/// Complete state of a single-server queue simulation
///
/// # Example
///
/// ```rust
/// use queue_simulator_core_rs::SimulationState;
///
/// let mut state = SimulationState::new(0);
/// state.advance_clock(0.8).unwrap();
/// assert_eq!(state.admit(), (0, 1));
///
/// state.advance_clock(1.3).unwrap();
/// let (arrived_at, before, after) = state.release().unwrap();
/// assert_eq!((arrived_at, before, after), (0.8, 1, 0));
/// ```
#[derive(Debug, Clone)]
pub struct SimulationState {
    clock: SimClock,

    /// Customers currently waiting or in service
    customers: u64,

    /// Arrival times of customers still in the system, oldest first
    pending_arrivals: VecDeque<f64>,
}

impl SimulationState {
    /// Create a state at time zero with `initial_customers` already present
    ///
    /// Pre-loaded customers are recorded as having arrived at time zero.
    pub fn new(initial_customers: u64) -> Self {
        let pending_arrivals = (0..initial_customers).map(|_| 0.0).collect();
        Self {
            clock: SimClock::new(),
            customers: initial_customers,
            pending_arrivals,
        }
    }

    /// Current simulation time
    pub fn clock(&self) -> f64 {
        self.clock.now()
    }

    /// Number of customers in the system
    pub fn customers(&self) -> u64 {
        self.customers
    }

    /// Unmatched arrival timestamps, oldest first
    pub fn pending_arrivals(&self) -> &VecDeque<f64> {
        &self.pending_arrivals
    }

    /// Whether the server is currently serving someone
    pub fn is_busy(&self) -> bool {
        self.customers > 0
    }

    /// Move the clock to the time of the event being applied
    pub fn advance_clock(&mut self, time: f64) -> Result<(), ClockError> {
        self.clock.advance_to(time)
    }

    /// Register an arrival at the current clock
    ///
    /// Returns the customer count before and after.
    pub fn admit(&mut self) -> (u64, u64) {
        let before = self.customers;
        self.customers += 1;
        self.pending_arrivals.push_back(self.clock.now());
        self.debug_check();
        (before, self.customers)
    }

    /// Register a departure at the current clock
    ///
    /// Returns the matched (oldest) arrival time and the customer count
    /// before and after. Fails if nobody is in the system, which means the
    /// departure scheduling rule was broken.
    pub fn release(&mut self) -> Result<(f64, u64, u64), SimulationError> {
        let now = self.clock.now();
        let arrived_at = self
            .pending_arrivals
            .pop_front()
            .ok_or_else(|| SimulationError::InconsistentState {
                time: now,
                reason: "departure with no pending arrivals".to_string(),
            })?;

        let before = self.customers;
        self.customers -= 1;
        self.debug_check();
        Ok((arrived_at, before, self.customers))
    }

    fn debug_check(&self) {
        debug_assert_eq!(
            self.customers as usize,
            self.pending_arrivals.len(),
            "customer count diverged from pending arrivals"
        );
    }
}
