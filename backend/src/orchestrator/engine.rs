//! Simulation Engine
//!
//! Event-driven dispatch loop for a single-server FIFO queue.
//!
//! # Architecture
//!
//! ```text
//! While Running:
//! 1. Stop if the iteration budget is spent
//! 2. Pop the earliest event (stop if none is pending)
//! 3. Advance the clock to the event time
//! 4. Apply the event:
//!    Arrival   → customers += 1, record arrival time, schedule next arrival,
//!                start service if the server was idle
//!    Departure → customers -= 1, match the oldest arrival (wait sample),
//!                start the next service if anyone is left
//! 5. Emit a notification and check the drain target / budget
//! ```
//!
//! A Departure is pending in the queue exactly when the server is busy.
//!
//! # Example
//!
//! ```rust
//! use queue_simulator_core_rs::{EngineStatus, SimulationConfig, SimulationEngine};
//!
//! let config = SimulationConfig {
//!     seed: Some(1),
//!     max_iterations: 1_000,
//!     ..SimulationConfig::new(1.0, 2.0)
//! };
//!
//! let mut engine = SimulationEngine::new(config).unwrap();
//! let summary = engine.run().unwrap();
//!
//! assert_eq!(summary.status, EngineStatus::TerminatedIterationBudget);
//! assert_eq!(summary.events_processed, 1_000);
//! assert!(engine.metrics().waits().count() > 0);
//! ```

use crate::arrivals::{validate_rate, RandomEventGenerator};
use crate::metrics::MetricsCollector;
use crate::models::event::{Event, EventKind, EventNotification, EventObserver};
use crate::models::queue::{EventQueue, QueueError};
use crate::models::state::SimulationState;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

// ============================================================================
// Configuration Types
// ============================================================================

fn default_max_iterations() -> u64 {
    10_000
}

/// Complete configuration of one simulation run
///
/// Budgets and customer counts are unsigned, so negative values cannot be
/// expressed. Rates and the drain target are checked by [`validate`].
///
/// [`validate`]: SimulationConfig::validate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// λ: mean arrivals per unit time
    pub arrival_rate: f64,

    /// μ: mean service completions per unit time
    pub service_rate: f64,

    /// RNG seed; `None` draws one from OS entropy
    #[serde(default)]
    pub seed: Option<u64>,

    /// Maximum number of events to process
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,

    /// Customers present at time zero
    #[serde(default)]
    pub initial_customers: u64,

    /// Stop the first time a departure leaves exactly this many customers
    #[serde(default)]
    pub drain_target: Option<u64>,
}

impl SimulationConfig {
    /// Configuration with default budget, no seed and an empty system
    pub fn new(arrival_rate: f64, service_rate: f64) -> Self {
        Self {
            arrival_rate,
            service_rate,
            seed: None,
            max_iterations: default_max_iterations(),
            initial_customers: 0,
            drain_target: None,
        }
    }

    /// Reject configurations that cannot start a run
    pub fn validate(&self) -> Result<(), SimulationError> {
        validate_rate("arrival_rate", self.arrival_rate)?;
        validate_rate("service_rate", self.service_rate)?;

        if let Some(target) = self.drain_target {
            if target >= self.initial_customers {
                return Err(SimulationError::InvalidConfig(format!(
                    "drain_target ({}) must be below initial_customers ({})",
                    target, self.initial_customers
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Errors and Status
// ============================================================================

/// Errors that stop a simulation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    /// Configuration validation error, raised before any event is processed
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A structural invariant was broken; the run cannot continue
    #[error("Inconsistent state at t={time}: {reason}")]
    InconsistentState { time: f64, reason: String },
}

/// Lifecycle of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    Running,
    /// No pending events remained
    TerminatedEmpty,
    /// `max_iterations` events were processed
    TerminatedIterationBudget,
    /// A departure left exactly `drain_target` customers
    TerminatedDrainTarget,
}

impl EngineStatus {
    pub fn is_terminated(&self) -> bool {
        !matches!(self, EngineStatus::Running)
    }
}

/// Outcome of [`SimulationEngine::run`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub status: EngineStatus,
    pub events_processed: u64,
    /// Clock value when the run stopped
    pub final_clock: f64,
    /// Seed of the run's random stream
    pub seed: u64,
}

// ============================================================================
// Engine
// ============================================================================

/// Owns everything one run needs: state, future-event list, random stream
/// and metrics. Nothing is shared between engines, so independent runs can
/// execute on different threads.
pub struct SimulationEngine {
    config: SimulationConfig,
    generator: RandomEventGenerator,
    queue: EventQueue,
    state: SimulationState,
    metrics: MetricsCollector,
    status: EngineStatus,
    events_processed: u64,
}

impl SimulationEngine {
    /// Validate `config` and prepare a run
    ///
    /// The queue is seeded with one Arrival at a freshly drawn interarrival
    /// time. With customers pre-loaded, a Departure is also scheduled (its
    /// service time is drawn after the first interarrival).
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let mut generator =
            RandomEventGenerator::new(config.arrival_rate, config.service_rate, config.seed)?;
        let state = SimulationState::new(config.initial_customers);
        let metrics = MetricsCollector::new(config.initial_customers);

        let mut queue = EventQueue::new();
        queue.insert(Event::arrival(generator.next_interarrival()));
        if state.is_busy() {
            queue.insert(Event::departure(generator.next_service_time()));
        }

        debug!(
            arrival_rate = config.arrival_rate,
            service_rate = config.service_rate,
            seed = generator.seed(),
            max_iterations = config.max_iterations,
            initial_customers = config.initial_customers,
            "Simulation engine created"
        );

        Ok(Self {
            config,
            generator,
            queue,
            state,
            metrics,
            status: EngineStatus::Running,
            events_processed: 0,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Seed of this run's random stream (replays the run when reused)
    pub fn seed(&self) -> u64 {
        self.generator.seed()
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Consume the engine, keeping only the collected samples
    pub fn into_metrics(self) -> MetricsCollector {
        self.metrics
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            status: self.status,
            events_processed: self.events_processed,
            final_clock: self.state.clock(),
            seed: self.generator.seed(),
        }
    }

    // ========================================================================
    // Dispatch Loop
    // ========================================================================

    /// Apply the next event
    ///
    /// Returns `Ok(None)` once the engine has terminated (and on the call
    /// that discovers termination by budget or empty queue).
    pub fn step(&mut self) -> Result<Option<EventNotification>, SimulationError> {
        if self.status.is_terminated() {
            return Ok(None);
        }

        if self.events_processed >= self.config.max_iterations {
            self.finish(EngineStatus::TerminatedIterationBudget);
            return Ok(None);
        }

        let event = match self.queue.pop_earliest() {
            Ok(event) => event,
            Err(QueueError::Empty) => {
                self.finish(EngineStatus::TerminatedEmpty);
                return Ok(None);
            }
        };

        self.state
            .advance_clock(event.time())
            .map_err(|e| SimulationError::InconsistentState {
                time: e.now,
                reason: e.to_string(),
            })?;

        let notification = match event.kind() {
            EventKind::Arrival => self.handle_arrival(),
            EventKind::Departure => self.handle_departure()?,
        };
        self.events_processed += 1;

        if notification.kind == EventKind::Departure
            && Some(notification.customers_after) == self.config.drain_target
        {
            self.finish(EngineStatus::TerminatedDrainTarget);
        } else if self.events_processed >= self.config.max_iterations {
            self.finish(EngineStatus::TerminatedIterationBudget);
        }

        Ok(Some(notification))
    }

    fn handle_arrival(&mut self) -> EventNotification {
        let now = self.state.clock();
        let (before, after) = self.state.admit();
        self.metrics.record_arrival(now, after);

        let next_arrival = now + self.generator.next_interarrival();
        self.queue.insert(Event::arrival(next_arrival));

        // Idle server: this customer goes straight into service
        if before == 0 {
            let completion = now + self.generator.next_service_time();
            self.queue.insert(Event::departure(completion));
        }

        EventNotification {
            time: now,
            kind: EventKind::Arrival,
            customers_before: before,
            customers_after: after,
            wait: None,
        }
    }

    fn handle_departure(&mut self) -> Result<EventNotification, SimulationError> {
        let now = self.state.clock();
        let (arrived_at, before, after) = self.state.release()?;
        let wait = now - arrived_at;
        self.metrics.record_departure(now, wait, after);

        if after > 0 {
            let completion = now + self.generator.next_service_time();
            self.queue.insert(Event::departure(completion));
        }

        Ok(EventNotification {
            time: now,
            kind: EventKind::Departure,
            customers_before: before,
            customers_after: after,
            wait: Some(wait),
        })
    }

    fn finish(&mut self, status: EngineStatus) {
        self.status = status;
        debug!(
            ?status,
            events_processed = self.events_processed,
            clock = self.state.clock(),
            "Simulation terminated"
        );
    }

    /// Run until termination
    pub fn run(&mut self) -> Result<RunSummary, SimulationError> {
        while self.step()?.is_some() {}
        Ok(self.summary())
    }

    /// Run until termination, passing every notification to `observer`
    pub fn run_observed(
        &mut self,
        observer: &mut dyn EventObserver,
    ) -> Result<RunSummary, SimulationError> {
        while let Some(notification) = self.step()? {
            observer.on_event(&notification);
        }
        Ok(self.summary())
    }

    /// Lazy sequence of notifications, driving the engine one step per item
    ///
    /// The sequence is finite and cannot be restarted: it ends when the
    /// engine terminates, or right after yielding an error.
    pub fn events(&mut self) -> Events<'_> {
        Events {
            engine: self,
            failed: false,
        }
    }
}

/// Iterator returned by [`SimulationEngine::events`]
pub struct Events<'a> {
    engine: &'a mut SimulationEngine,
    failed: bool,
}

impl Iterator for Events<'_> {
    type Item = Result<EventNotification, SimulationError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.engine.step() {
            Ok(notification) => notification.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64, max_iterations: u64) -> SimulationConfig {
        SimulationConfig {
            seed: Some(seed),
            max_iterations,
            ..SimulationConfig::new(1.0, 2.0)
        }
    }

    #[test]
    fn test_empty_queue_terminates_normally() {
        let mut engine = SimulationEngine::new(seeded(3, 100)).unwrap();
        engine.queue = EventQueue::new();

        assert_eq!(engine.step(), Ok(None));
        assert_eq!(engine.status(), EngineStatus::TerminatedEmpty);
        assert_eq!(engine.events_processed(), 0);
    }

    #[test]
    fn test_orphan_departure_is_fatal() {
        let mut engine = SimulationEngine::new(seeded(3, 100)).unwrap();
        engine.queue = EventQueue::new();
        engine.queue.insert(Event::departure(0.5));

        let mut events = engine.events();
        match events.next() {
            Some(Err(SimulationError::InconsistentState { time, .. })) => assert_eq!(time, 0.5),
            other => panic!("expected InconsistentState, got {:?}", other),
        }
        assert!(events.next().is_none(), "iterator must stop after an error");
    }

    #[test]
    fn test_backwards_event_is_fatal() {
        let mut engine = SimulationEngine::new(seeded(5, 100)).unwrap();
        engine.step().unwrap();
        let now = engine.state().clock();

        engine.queue = EventQueue::new();
        engine.queue.insert(Event::arrival(now / 2.0));

        assert!(matches!(
            engine.step(),
            Err(SimulationError::InconsistentState { .. })
        ));
    }

    #[test]
    fn test_simultaneous_arrival_processed_before_departure() {
        let config = SimulationConfig {
            initial_customers: 1,
            ..seeded(4, 100)
        };
        let mut engine = SimulationEngine::new(config).unwrap();
        engine.queue = EventQueue::new();
        engine.queue.insert(Event::departure(1.0));
        engine.queue.insert(Event::arrival(1.0));

        let first = engine.step().unwrap().unwrap();
        assert_eq!(first.kind, EventKind::Arrival);
        assert_eq!((first.customers_before, first.customers_after), (1, 2));
        // Server already busy: no second departure
        assert_eq!(engine.queue().pending_of_kind(EventKind::Departure), 1);

        let second = engine.step().unwrap().unwrap();
        assert_eq!(second.kind, EventKind::Departure);
        assert_eq!(second.time, 1.0);
        assert_eq!(second.wait, Some(1.0));
        assert_eq!(engine.queue().pending_of_kind(EventKind::Departure), 1);
    }

    #[test]
    fn test_first_event_is_arrival() {
        let mut engine = SimulationEngine::new(seeded(11, 10)).unwrap();
        let first = engine.step().unwrap().unwrap();

        assert_eq!(first.kind, EventKind::Arrival);
        assert_eq!((first.customers_before, first.customers_after), (0, 1));
        assert_eq!(engine.queue().pending_of_kind(EventKind::Departure), 1);
    }

    #[test]
    fn test_preloaded_customers_schedule_departure() {
        let config = SimulationConfig {
            initial_customers: 3,
            ..seeded(8, 10)
        };
        let engine = SimulationEngine::new(config).unwrap();

        assert_eq!(engine.state().customers(), 3);
        assert_eq!(engine.queue().len(), 2);
        assert_eq!(engine.queue().pending_of_kind(EventKind::Departure), 1);
    }

    #[test]
    fn test_step_after_termination_is_noop() {
        let mut engine = SimulationEngine::new(seeded(2, 1)).unwrap();
        assert!(engine.step().unwrap().is_some());
        assert_eq!(engine.status(), EngineStatus::TerminatedIterationBudget);

        let clock = engine.state().clock();
        assert_eq!(engine.step(), Ok(None));
        assert_eq!(engine.state().clock(), clock);
        assert_eq!(engine.events_processed(), 1);
    }

    #[test]
    fn test_drain_target_must_be_below_initial_customers() {
        let config = SimulationConfig {
            initial_customers: 2,
            drain_target: Some(2),
            ..seeded(1, 10)
        };
        assert!(matches!(
            SimulationEngine::new(config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }
}
