//! Simulation events and event notifications.
//!
//! Two related types live here:
//! - [`Event`]: a pending entry in the future-event list (time + kind)
//! - [`EventNotification`]: what the engine reports after applying an event
//!
//! Notifications are delivered to an [`EventObserver`]. Rendering them (the
//! CLI narration) or storing them ([`EventLog`]) happens outside the
//! dispatch loop.
//!
//! # Example
//!
//! ```rust
//! use queue_simulator_core_rs::models::{EventKind, EventNotification};
//!
//! let note = EventNotification {
//!     time: 1.25,
//!     kind: EventKind::Arrival,
//!     customers_before: 0,
//!     customers_after: 1,
//!     wait: None,
//! };
//!
//! assert_eq!(note.to_string(), "[001.2500]    arrival, 0 => 1");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a scheduled event.
///
/// Variant order is the tie-break order: at identical times an Arrival is
/// processed before a Departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Arrival,
    Departure,
}

impl EventKind {
    /// Lowercase label used in narration
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Arrival => "arrival",
            EventKind::Departure => "departure",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A pending event in the future-event list. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    time: f64,
    kind: EventKind,
}

impl Event {
    /// Create an event at `time` (finite, non-negative)
    pub fn new(time: f64, kind: EventKind) -> Self {
        debug_assert!(
            time.is_finite() && time >= 0.0,
            "event time must be finite and non-negative, got {}",
            time
        );
        Self { time, kind }
    }

    /// Shorthand for an arrival at `time`
    pub fn arrival(time: f64) -> Self {
        Self::new(time, EventKind::Arrival)
    }

    /// Shorthand for a departure at `time`
    pub fn departure(time: f64) -> Self {
        Self::new(time, EventKind::Departure)
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

/// Report of one applied event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventNotification {
    /// Clock value at which the event was applied
    pub time: f64,
    pub kind: EventKind,
    pub customers_before: u64,
    pub customers_after: u64,
    /// Time in system of the departing customer (departures only)
    pub wait: Option<f64>,
}

impl fmt::Display for EventNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:08.4}] {:>10}, {} => {}",
            self.time,
            self.kind.label(),
            self.customers_before,
            self.customers_after
        )
    }
}

/// Receives every notification produced by a running engine.
pub trait EventObserver {
    fn on_event(&mut self, notification: &EventNotification);
}

impl<F> EventObserver for F
where
    F: FnMut(&EventNotification),
{
    fn on_event(&mut self, notification: &EventNotification) {
        self(notification)
    }
}

/// Event log for storing and querying notifications.
///
/// A simple wrapper around `Vec<EventNotification>` that can be attached to
/// an engine as an observer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventLog {
    events: Vec<EventNotification>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add a notification to the log
    pub fn log(&mut self, notification: EventNotification) {
        self.events.push(notification);
    }

    /// Get the number of notifications logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all notifications
    pub fn events(&self) -> &[EventNotification] {
        &self.events
    }

    /// Get notifications of a specific kind
    pub fn events_of_kind(&self, kind: EventKind) -> Vec<&EventNotification> {
        self.events.iter().filter(|e| e.kind == kind).collect()
    }

    /// Customer count after each logged event, in order
    pub fn customer_counts(&self) -> Vec<u64> {
        self.events.iter().map(|e| e.customers_after).collect()
    }

    /// Clear all notifications
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventObserver for EventLog {
    fn on_event(&mut self, notification: &EventNotification) {
        self.log(*notification);
    }
}
