//! Future-event list
//!
//! A min-priority queue of pending [`Event`]s backed by a `BTreeMap`. The
//! map key gives a total, deterministic order:
//!
//! 1. Time (earlier first)
//! 2. Kind (Arrival before Departure at identical times)
//! 3. Insertion sequence (FIFO among otherwise equal events)
//!
//! Global order holds no matter how many events are pending, so the head of
//! the queue is always the next event to process.

use crate::models::event::{Event, EventKind};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from queue access
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// No pending events. The engine treats this as normal termination.
    #[error("Event queue is empty")]
    Empty,
}

/// Ordering key for pending events.
#[derive(Debug, Clone, Copy)]
struct EventKey {
    time: f64,
    kind: EventKind,
    sequence: u64,
}

impl Ord for EventKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.time.total_cmp(&other.time) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match self.kind.cmp(&other.kind) {
            Ordering::Equal => {}
            ord => return ord,
        }

        self.sequence.cmp(&other.sequence)
    }
}

impl PartialOrd for EventKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for EventKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EventKey {}

/// Ordered collection of pending events
///
/// # Example
/// ```
/// use queue_simulator_core_rs::models::{Event, EventKind, EventQueue};
///
/// let mut queue = EventQueue::new();
/// queue.insert(Event::departure(2.0));
/// queue.insert(Event::arrival(0.5));
/// queue.insert(Event::arrival(2.0));
///
/// assert_eq!(queue.pop_earliest().unwrap(), Event::arrival(0.5));
/// // Tie at t=2.0: the arrival goes first
/// assert_eq!(queue.pop_earliest().unwrap().kind(), EventKind::Arrival);
/// assert_eq!(queue.pop_earliest().unwrap().kind(), EventKind::Departure);
/// assert!(queue.pop_earliest().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: BTreeMap<EventKey, Event>,
    next_sequence: u64,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event, keeping global time order
    pub fn insert(&mut self, event: Event) {
        let key = EventKey {
            time: event.time(),
            kind: event.kind(),
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.events.insert(key, event);
    }

    /// The next event to process, without removing it
    pub fn peek_earliest(&self) -> Result<&Event, QueueError> {
        self.events
            .first_key_value()
            .map(|(_, event)| event)
            .ok_or(QueueError::Empty)
    }

    /// Remove and return the next event to process
    pub fn pop_earliest(&mut self) -> Result<Event, QueueError> {
        self.events
            .pop_first()
            .map(|(_, event)| event)
            .ok_or(QueueError::Empty)
    }

    /// Number of pending events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of pending events of one kind
    pub fn pending_of_kind(&self, kind: EventKind) -> usize {
        self.events.values().filter(|e| e.kind() == kind).count()
    }

    /// Pending events in processing order
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }
}
