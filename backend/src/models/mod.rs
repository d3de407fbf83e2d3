//! Domain models for the queue simulator

pub mod event;
pub mod queue;
pub mod state;

// Re-exports
pub use event::{Event, EventKind, EventLog, EventNotification, EventObserver};
pub use queue::{EventQueue, QueueError};
pub use state::SimulationState;
