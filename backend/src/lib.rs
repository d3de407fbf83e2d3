//! Queue Simulator Core - Rust Engine
//!
//! Discrete-event simulator of a single-server FIFO queue with Poisson
//! arrivals and exponential service times (M/M/1), with deterministic
//! execution for a given seed.
//!
//! # Architecture
//!
//! - **core**: Simulation clock
//! - **models**: Domain types (Event, EventQueue, SimulationState)
//! - **arrivals**: Interarrival and service time generation
//! - **orchestrator**: Dispatch loop, replications and drain-time sweeps
//! - **metrics**: Sample sets, batch means and confidence intervals
//! - **analysis**: Closed-form M/M/1 predictions
//! - **report**: End-of-run summary and analytical comparison
//! - **trace**: Customer-count trace files
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. The clock never moves backwards
//! 2. Events are processed in time order; at equal times Arrivals come
//!    before Departures, then insertion order
//! 3. All randomness is deterministic (seeded RNG)
//! 4. A Departure is pending exactly when the server is busy

// Module declarations
pub mod analysis;
pub mod arrivals;
pub mod core;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod rng;
pub mod trace;

// Re-exports for convenience
pub use analysis::QueueParameters;
pub use arrivals::RandomEventGenerator;
pub use core::time::{ClockError, SimClock};
pub use metrics::{interval, ConfidenceInterval, MetricsCollector, SampleSet, StatsError, Z_95};
pub use models::{
    event::{Event, EventKind, EventLog, EventNotification, EventObserver},
    queue::{EventQueue, QueueError},
    state::SimulationState,
};
pub use orchestrator::{
    drain_time_sweep, replicate, Coverage, DrainTimeResult, EngineStatus, Events,
    ReplicationRun, ReplicationSummary, RunSummary, SimulationConfig, SimulationEngine,
    SimulationError, DEFAULT_BATCHES,
};
pub use report::{Comparison, MetricSummary, SimulationReport, Verdict};
pub use rng::RngManager;
pub use trace::{format_trace, parse_trace, read_trace, write_trace, TraceError};
