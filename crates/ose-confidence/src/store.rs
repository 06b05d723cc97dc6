//! Pattern confidence store
//!
//! The only shared mutable state in the engine. Each record is updated under
//! its map entry's write lock, so read-modify-write cycles on one pattern id
//! are serialized while different ids proceed in parallel.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Weight given to a new observation
pub const LEARNING_RATE: f64 = 0.1;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfidenceError {
    #[error("learning rate must be in [0.0, 1.0], got {0}")]
    InvalidLearningRate(f64),

    #[error("quality score must be a finite number in [0.0, 1.0], got {0}")]
    InvalidScore(f64),

    #[error("confidence for {pattern_id} must be in [0.0, 1.0], got {value}")]
    InvalidPrior { pattern_id: String, value: f64 },

    #[error("unknown pattern {0}")]
    UnknownPattern(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConfidence {
    pub pattern_id: String,
    pub confidence: f64,
    pub update_count: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PatternConfidence {
    pub fn new(pattern_id: impl Into<String>, confidence: f64) -> Self {
        Self {
            pattern_id: pattern_id.into(),
            confidence,
            update_count: 0,
            updated_at: None,
        }
    }
}

/// Exponential moving average: `C_new = C_old * (1 - α) + Ξ * α`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceUpdater {
    learning_rate: f64,
}

impl Default for ConfidenceUpdater {
    fn default() -> Self {
        Self {
            learning_rate: LEARNING_RATE,
        }
    }
}

impl ConfidenceUpdater {
    pub fn new(learning_rate: f64) -> Result<Self, ConfidenceError> {
        if !learning_rate.is_finite() || !(0.0..=1.0).contains(&learning_rate) {
            return Err(ConfidenceError::InvalidLearningRate(learning_rate));
        }
        Ok(Self { learning_rate })
    }

    /// Next confidence value. Never moves past `xi`.
    pub fn next(&self, current: f64, xi: f64) -> Result<f64, ConfidenceError> {
        if !xi.is_finite() || !(0.0..=1.0).contains(&xi) {
            return Err(ConfidenceError::InvalidScore(xi));
        }

        let updated = current * (1.0 - self.learning_rate) + xi * self.learning_rate;
        let (low, high) = if current <= xi { (current, xi) } else { (xi, current) };
        Ok(updated.clamp(low, high))
    }
}

#[derive(Debug, Default)]
pub struct ConfidenceStore {
    entries: DashMap<String, PatternConfidence>,
    updater: ConfidenceUpdater,
}

impl ConfidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prior for a pattern. Existing records are left untouched.
    pub fn seed(&self, pattern_id: &str, prior: f64) -> Result<(), ConfidenceError> {
        if !prior.is_finite() || !(0.0..=1.0).contains(&prior) {
            return Err(ConfidenceError::InvalidPrior {
                pattern_id: pattern_id.to_string(),
                value: prior,
            });
        }

        self.entries
            .entry(pattern_id.to_string())
            .or_insert_with(|| PatternConfidence::new(pattern_id, prior));
        Ok(())
    }

    pub fn get(&self, pattern_id: &str) -> Option<PatternConfidence> {
        self.entries.get(pattern_id).map(|entry| entry.clone())
    }

    pub fn confidence(&self, pattern_id: &str) -> Option<f64> {
        self.entries.get(pattern_id).map(|entry| entry.confidence)
    }

    pub fn contains(&self, pattern_id: &str) -> bool {
        self.entries.contains_key(pattern_id)
    }

    /// Fold one quality observation into a seeded pattern's confidence.
    /// Ids that were never seeded are refused and no record is created.
    pub fn apply(&self, pattern_id: &str, xi: f64) -> Result<PatternConfidence, ConfidenceError> {
        if !xi.is_finite() || !(0.0..=1.0).contains(&xi) {
            return Err(ConfidenceError::InvalidScore(xi));
        }

        let mut entry = self
            .entries
            .get_mut(pattern_id)
            .ok_or_else(|| ConfidenceError::UnknownPattern(pattern_id.to_string()))?;

        let previous = entry.confidence;
        entry.confidence = self.updater.next(previous, xi)?;
        entry.update_count += 1;
        entry.updated_at = Some(Utc::now());

        debug!(
            pattern_id = %pattern_id,
            previous = previous,
            confidence = entry.confidence,
            xi = xi,
            update_count = entry.update_count,
            "confidence updated"
        );

        Ok(entry.clone())
    }

    /// Point-in-time copy of every record, sorted by pattern id
    pub fn snapshot(&self) -> Vec<PatternConfidence> {
        let mut records: Vec<PatternConfidence> =
            self.entries.iter().map(|entry| entry.value().clone()).collect();
        records.sort_by(|a, b| a.pattern_id.cmp(&b.pattern_id));
        records
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_ema_step() {
        let updater = ConfidenceUpdater::default();
        let next = updater.next(0.8, 0.6).unwrap();
        assert!((next - 0.78).abs() < 1e-12);
    }

    #[test]
    fn test_zero_rate_is_idempotent() {
        let updater = ConfidenceUpdater::new(0.0).unwrap();
        let mut c = 0.42;
        for _ in 0..50 {
            c = updater.next(c, 0.95).unwrap();
        }
        assert_eq!(c, 0.42);
    }

    #[test]
    fn test_repeated_updates_converge_without_overshoot() {
        let updater = ConfidenceUpdater::default();

        for (start, xi) in [(0.2, 0.9), (0.95, 0.1), (0.5, 0.5)] {
            let mut c: f64 = start;
            let mut gap = (c - xi).abs();
            for n in 1..=200 {
                c = updater.next(c, xi).unwrap();
                let new_gap = (c - xi).abs();
                assert!(new_gap <= gap);
                if start < xi {
                    assert!(c <= xi);
                } else {
                    assert!(c >= xi);
                }
                let expected = xi + (start - xi) * (1.0 - LEARNING_RATE).powi(n);
                assert!((c - expected).abs() < 1e-9);
                gap = new_gap;
            }
            assert!((c - xi).abs() < 1e-6);
        }
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(ConfidenceUpdater::new(1.5).is_err());
        assert!(ConfidenceUpdater::new(f64::NAN).is_err());

        let updater = ConfidenceUpdater::default();
        assert_eq!(updater.next(0.5, 1.1), Err(ConfidenceError::InvalidScore(1.1)));
        assert!(updater.next(0.5, f64::NAN).is_err());

        let store = ConfidenceStore::new();
        assert!(store.seed("cqrs-v1", -0.2).is_err());
        store.seed("cqrs-v1", 0.8).unwrap();
        assert!(store.apply("cqrs-v1", 2.0).is_err());
    }

    #[test]
    fn test_failed_update_leaves_record_unchanged() {
        let store = ConfidenceStore::new();
        store.seed("cqrs-v1", 0.82).unwrap();
        assert!(store.apply("cqrs-v1", f64::INFINITY).is_err());

        let record = store.get("cqrs-v1").unwrap();
        assert_eq!(record.confidence, 0.82);
        assert_eq!(record.update_count, 0);
    }

    #[test]
    fn test_seed_does_not_overwrite() {
        let store = ConfidenceStore::new();
        store.seed("rest-api-v1", 0.92).unwrap();
        store.apply("rest-api-v1", 0.5).unwrap();
        store.seed("rest-api-v1", 0.1).unwrap();

        let record = store.get("rest-api-v1").unwrap();
        assert_eq!(record.update_count, 1);
        assert!(record.confidence > 0.8);
    }

    #[test]
    fn test_unknown_pattern_is_refused() {
        let store = ConfidenceStore::new();
        store.seed("cqrs-v1", 0.82).unwrap();

        for _ in 0..100 {
            assert_eq!(
                store.apply("made-up-v1", 1.0),
                Err(ConfidenceError::UnknownPattern("made-up-v1".into()))
            );
        }
        assert_eq!(store.len(), 1);
        assert!(!store.contains("made-up-v1"));
        assert!(store.get("made-up-v1").is_none());

        let record = store.apply("cqrs-v1", 1.0).unwrap();
        assert!(record.updated_at.is_some());
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 250;

        let store = Arc::new(ConfidenceStore::new());
        store.seed("circuit-breaker-v1", 0.85).unwrap();
        store.seed("cache-aside-v1", 0.8).unwrap();

        std::thread::scope(|scope| {
            for t in 0..THREADS {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for _ in 0..PER_THREAD {
                        store.apply("circuit-breaker-v1", 0.4).unwrap();
                        if t % 2 == 0 {
                            store.apply("cache-aside-v1", 0.9).unwrap();
                        }
                    }
                });
            }
        });

        let total = (THREADS * PER_THREAD) as i32;
        let record = store.get("circuit-breaker-v1").unwrap();
        assert_eq!(record.update_count, total as u64);

        let expected = 0.4 + (0.85 - 0.4) * (1.0 - LEARNING_RATE).powi(total);
        assert!((record.confidence - expected).abs() < 1e-9);

        let other = store.get("cache-aside-v1").unwrap();
        assert_eq!(other.update_count, (THREADS / 2 * PER_THREAD) as u64);
    }

    #[test]
    fn test_snapshot_is_sorted_copy() {
        let store = ConfidenceStore::new();
        store.seed("work-queue-v1", 0.8).unwrap();
        store.seed("backpressure-v1", 0.9).unwrap();

        let snapshot = store.snapshot();
        store.apply("backpressure-v1", 0.0).unwrap();

        assert_eq!(snapshot[0].pattern_id, "backpressure-v1");
        assert_eq!(snapshot[0].confidence, 0.9);
        assert_eq!(store.len(), 2);
    }
}
