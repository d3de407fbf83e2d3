//! Orchestrator - simulation engine and multi-run helpers
//!
//! See `engine.rs` for the dispatch loop and `replication.rs` for
//! independent replications and drain-time sweeps.

pub mod engine;
pub mod replication;

// Re-export main types for convenience
pub use engine::{
    EngineStatus, Events, RunSummary, SimulationConfig, SimulationEngine, SimulationError,
};
pub use replication::{
    drain_time_sweep, replicate, Coverage, DrainTimeResult, ReplicationRun, ReplicationSummary,
    DEFAULT_BATCHES,
};
