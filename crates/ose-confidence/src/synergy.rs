//! Pattern pair synergy analysis
//!
//! A pair is synergistic when services applying both patterns score higher
//! than the average of services applying either one alone, by more than
//! [`SYNERGY_MARGIN`]. The analysis is a read-only batch over a snapshot of
//! the observation log.

use crate::observations::Observation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Minimum lift of the joint mean over the solo means
pub const SYNERGY_MARGIN: f64 = 0.05;

/// Joint observations needed before a pair is considered
pub const MIN_PAIR_OBSERVATIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyPair {
    pub first: String,
    pub second: String,
    pub together_mean: f64,
    pub first_solo_mean: f64,
    pub second_solo_mean: f64,
    pub together_count: usize,
}

impl SynergyPair {
    /// Joint mean minus the mean of the two solo means
    pub fn lift(&self) -> f64 {
        self.together_mean - (self.first_solo_mean + self.second_solo_mean) / 2.0
    }
}

/// Find synergistic pairs, strongest lift first
pub fn detect_synergies(observations: &[Observation]) -> Vec<SynergyPair> {
    let mut candidates: BTreeSet<(&str, &str)> = BTreeSet::new();
    for obs in observations {
        for (i, first) in obs.patterns.iter().enumerate() {
            for second in &obs.patterns[i + 1..] {
                candidates.insert((first.as_str(), second.as_str()));
            }
        }
    }

    let mut pairs: Vec<SynergyPair> = candidates
        .into_iter()
        .filter_map(|(first, second)| evaluate_pair(observations, first, second))
        .filter(|pair| pair.lift() > SYNERGY_MARGIN)
        .collect();

    pairs.sort_by(|a, b| {
        b.lift()
            .total_cmp(&a.lift())
            .then_with(|| a.first.cmp(&b.first))
            .then_with(|| a.second.cmp(&b.second))
    });
    pairs
}

fn evaluate_pair(observations: &[Observation], first: &str, second: &str) -> Option<SynergyPair> {
    let mut together = Mean::default();
    let mut first_solo = Mean::default();
    let mut second_solo = Mean::default();

    for obs in observations {
        match (obs.contains(first), obs.contains(second)) {
            (true, true) => together.add(obs.xi),
            (true, false) => first_solo.add(obs.xi),
            (false, true) => second_solo.add(obs.xi),
            (false, false) => {}
        }
    }

    if together.count < MIN_PAIR_OBSERVATIONS {
        return None;
    }

    Some(SynergyPair {
        first: first.to_string(),
        second: second.to_string(),
        together_mean: together.value()?,
        first_solo_mean: first_solo.value()?,
        second_solo_mean: second_solo.value()?,
        together_count: together.count,
    })
}

#[derive(Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(id: &str, patterns: &[&str], xi: f64) -> Observation {
        Observation::new(id, patterns.iter().copied(), xi)
    }

    #[test]
    fn test_detects_lift_above_margin() {
        let log = vec![
            obs("bp-1", &["cqrs-v1", "event-sourcing-v1"], 0.90),
            obs("bp-2", &["cqrs-v1", "event-sourcing-v1"], 0.86),
            obs("bp-3", &["cqrs-v1"], 0.70),
            obs("bp-4", &["event-sourcing-v1"], 0.74),
        ];

        let pairs = detect_synergies(&log);
        assert_eq!(pairs.len(), 1);

        let pair = &pairs[0];
        assert_eq!(pair.first, "cqrs-v1");
        assert_eq!(pair.second, "event-sourcing-v1");
        assert_eq!(pair.together_count, 2);
        assert!((pair.together_mean - 0.88).abs() < 1e-9);
        assert!((pair.lift() - 0.16).abs() < 1e-9);
    }

    #[test]
    fn test_lift_within_margin_is_ignored() {
        let log = vec![
            obs("bp-1", &["a", "b"], 0.74),
            obs("bp-2", &["a", "b"], 0.74),
            obs("bp-3", &["a"], 0.70),
            obs("bp-4", &["b"], 0.70),
        ];
        assert!(detect_synergies(&log).is_empty());
    }

    #[test]
    fn test_requires_solo_history_and_enough_joint_runs() {
        // only one joint observation
        let log = vec![
            obs("bp-1", &["a", "b"], 0.95),
            obs("bp-2", &["a"], 0.4),
            obs("bp-3", &["b"], 0.4),
        ];
        assert!(detect_synergies(&log).is_empty());

        // b never applied alone
        let log = vec![
            obs("bp-1", &["a", "b"], 0.95),
            obs("bp-2", &["a", "b"], 0.95),
            obs("bp-3", &["a"], 0.4),
        ];
        assert!(detect_synergies(&log).is_empty());
    }

    #[test]
    fn test_pairs_sorted_by_lift() {
        let log = vec![
            obs("bp-1", &["a", "b", "c"], 0.9),
            obs("bp-2", &["a", "b", "c"], 0.9),
            obs("bp-3", &["a"], 0.5),
            obs("bp-4", &["b"], 0.5),
            obs("bp-5", &["c"], 0.7),
        ];

        let pairs = detect_synergies(&log);
        assert_eq!(pairs.len(), 3);
        assert_eq!((pairs[0].first.as_str(), pairs[0].second.as_str()), ("a", "b"));
        assert!(pairs.windows(2).all(|w| w[0].lift() >= w[1].lift()));
    }

    #[test]
    fn test_empty_log() {
        assert!(detect_synergies(&[]).is_empty());
    }
}
