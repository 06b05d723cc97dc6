//! Historical Xi observations, one per registered service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::sync::RwLock;

/// Observations kept when no capacity is configured
pub const DEFAULT_OBSERVATION_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub blueprint_id: String,
    /// Distinct pattern ids applied by the service, sorted
    pub patterns: Vec<String>,
    pub xi: f64,
    pub recorded_at: DateTime<Utc>,
}

impl Observation {
    pub fn new<I, S>(blueprint_id: impl Into<String>, patterns: I, xi: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: BTreeSet<String> = patterns.into_iter().map(Into::into).collect();
        Self {
            blueprint_id: blueprint_id.into(),
            patterns: patterns.into_iter().collect(),
            xi,
            recorded_at: Utc::now(),
        }
    }

    pub fn contains(&self, pattern_id: &str) -> bool {
        self.patterns
            .binary_search_by(|p| p.as_str().cmp(pattern_id))
            .is_ok()
    }
}

/// Bounded log read by the synergy job. Once full, each new observation
/// evicts the oldest one.
///
/// Readers take a copy; they never hold the lock while analysing.
#[derive(Debug)]
pub struct ObservationLog {
    entries: RwLock<VecDeque<Observation>>,
    capacity: usize,
}

impl Default for ObservationLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_OBSERVATION_CAPACITY)
    }
}

impl ObservationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of zero is raised to one
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&self, observation: Observation) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(observation);
    }

    /// Oldest first
    pub fn snapshot(&self) -> Vec<Observation> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_are_deduplicated_and_sorted() {
        let obs = Observation::new("bp-1", ["cqrs-v1", "cache-aside-v1", "cqrs-v1"], 0.7);
        assert_eq!(obs.patterns, vec!["cache-aside-v1", "cqrs-v1"]);
        assert!(obs.contains("cqrs-v1"));
        assert!(!obs.contains("work-queue-v1"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let log = ObservationLog::new();
        log.record(Observation::new("bp-1", ["a"], 0.5));
        let snapshot = log.snapshot();
        log.record(Observation::new("bp-2", ["b"], 0.6));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_log_is_bounded_and_evicts_oldest() {
        let log = ObservationLog::with_capacity(100);
        for i in 0..10_000 {
            log.record(Observation::new(format!("bp-{i}"), ["cqrs-v1"], 0.5));
        }

        assert_eq!(log.len(), 100);
        let snapshot = log.snapshot();
        assert_eq!(snapshot[0].blueprint_id, "bp-9900");
        assert_eq!(snapshot[99].blueprint_id, "bp-9999");
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let log = ObservationLog::with_capacity(0);
        log.record(Observation::new("bp-1", ["a"], 0.5));
        log.record(Observation::new("bp-2", ["a"], 0.5));

        assert_eq!(log.capacity(), 1);
        assert_eq!(log.snapshot()[0].blueprint_id, "bp-2");
    }
}
