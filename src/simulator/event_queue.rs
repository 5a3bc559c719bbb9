use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::models::NodeRef;
use crate::utils::errors::SimulationError;

/// A pending occurrence in the network: at `time`, job `job_id` either
/// arrives from outside stream `node` or completes service at station
/// `node`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub time: f64,
    pub job_id: u64,
    pub node: NodeRef,
}

impl Event {
    pub fn new(time: f64, job_id: u64, node: NodeRef) -> Self {
        Self { time, job_id, node }
    }
}

/// Events order by time, then job id, then node (outside streams before
/// stations, each by ascending index).
impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.job_id.cmp(&other.job_id))
            .then(self.node.cmp(&other.node))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

/// The future event list: a min-priority queue over `Event`.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: BinaryHeap<Reverse<Event>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an event.  Event times must be finite and non-negative.
    pub fn schedule(&mut self, event: Event) -> Result<(), SimulationError> {
        if !event.time.is_finite() || event.time < 0.0 {
            return Err(SimulationError::EventSchedulingError);
        }
        self.events.push(Reverse(event));
        Ok(())
    }

    /// Remove and return the earliest event.
    pub fn pop_earliest(&mut self) -> Result<Event, SimulationError> {
        self.events
            .pop()
            .map(|Reverse(event)| event)
            .ok_or(SimulationError::EmptyEventQueue)
    }

    pub fn peek(&self) -> Option<&Event> {
        self.events.peek().map(|Reverse(event)| event)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
