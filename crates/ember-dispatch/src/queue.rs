//! Incident priority queue, a max-heap over a score frozen at insertion.
//!
//! score = intensity × priority weight + affected area − hours since detection.
//! The score does not decay while queued; re-scoring means re-inserting
//! (see `DispatchEngine::rescore_queue`). Equal scores extract FIFO.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use ember_core::records::Incident;
use ember_core::types::{hours_between, IncidentId, Timestamp};

use crate::store::FleetStore;

/// Priority score of `incident` as seen at `now`.
pub fn priority_score(incident: &Incident, now: Timestamp) -> f64 {
    incident.intensity as f64 * incident.priority.weight() as f64 + incident.area
        - hours_between(incident.detected_at, now)
}

/// A queue entry: the incident, its frozen score and its insertion sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedIncident {
    pub incident_id: IncidentId,
    pub score: f64,
    seq: u64,
}

impl Eq for QueuedIncident {}

impl Ord for QueuedIncident {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            // Earlier insertion ranks higher among equal scores.
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedIncident {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct IncidentQueue {
    heap: BinaryHeap<QueuedIncident>,
    next_seq: u64,
}

impl IncidentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an incident, freezing its score at `now`. Returns the score.
    pub fn insert(&mut self, incident: &Incident, now: Timestamp) -> f64 {
        let score = priority_score(incident, now);
        self.insert_scored(incident.id, score);
        score
    }

    /// Queue an incident id with a precomputed score.
    pub fn insert_scored(&mut self, incident_id: IncidentId, score: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueuedIncident {
            incident_id,
            score,
            seq,
        });
    }

    /// Remove and return the highest-scored entry, or `None` when empty.
    pub fn extract_max(&mut self) -> Option<QueuedIncident> {
        self.heap.pop()
    }

    pub fn peek(&self) -> Option<&QueuedIncident> {
        self.heap.peek()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Remove every entry, highest score first.
    pub fn drain_ranked(&mut self) -> Vec<QueuedIncident> {
        std::mem::take(&mut self.heap).into_sorted_vec().into_iter().rev().collect()
    }

    /// Queued incidents that are still active, in heap order.
    /// Callers must not rely on the order.
    pub fn snapshot_active<'a>(&self, store: &'a FleetStore) -> Vec<&'a Incident> {
        let mut seen = HashSet::new();
        self.heap
            .iter()
            .filter(|entry| seen.insert(entry.incident_id))
            .filter_map(|entry| store.incident(entry.incident_id))
            .filter(|incident| incident.is_active())
            .collect()
    }

    /// Queued incidents that are still active, highest score first.
    pub fn ranked_active<'a>(&self, store: &'a FleetStore) -> Vec<&'a Incident> {
        let mut entries: Vec<&QueuedIncident> = self.heap.iter().collect();
        entries.sort_by(|a, b| b.cmp(a));
        let mut seen = HashSet::new();
        entries
            .into_iter()
            .filter(|entry| seen.insert(entry.incident_id))
            .filter_map(|entry| store.incident(entry.incident_id))
            .filter(|incident| incident.is_active())
            .collect()
    }
}
