//! Bounded de-duplication of event ids across overlapping pages.

use std::collections::{HashSet, VecDeque};

/// Maximum number of events a single log query page may return.
pub const MAX_EVENTS_PER_CALL: usize = 10_000;

/// Fixed-capacity FIFO membership set of recently emitted event ids.
///
/// Suppresses an id already held in the window. Once `capacity` ids are held,
/// recording a new one evicts the oldest, so a duplicate separated from its
/// first sighting by more than `capacity` distinct ids is emitted again.
/// This is a sliding horizon, not an exactly-once guarantee.
#[derive(Debug, Clone)]
pub struct DedupWindow {
    capacity: usize,
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl DedupWindow {
    /// Creates an empty window. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity.min(MAX_EVENTS_PER_CALL)),
            seen: HashSet::with_capacity(capacity.min(MAX_EVENTS_PER_CALL)),
        }
    }

    /// Returns `true` and records `event_id` if it is not already in the window.
    pub fn should_emit(&mut self, event_id: &str) -> bool {
        if self.seen.contains(event_id) {
            return false;
        }

        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }

        self.order.push_back(event_id.to_string());
        self.seen.insert(event_id.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self::new(MAX_EVENTS_PER_CALL)
    }
}
