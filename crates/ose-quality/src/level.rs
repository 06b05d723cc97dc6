//! Human-readable bands for an overall score

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality bands, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityLevel {
    #[serde(rename = "CRITICAL")]
    Critical,
    #[serde(rename = "POOR")]
    Poor,
    #[serde(rename = "ACCEPTABLE")]
    Acceptable,
    #[serde(rename = "GOOD")]
    Good,
    #[serde(rename = "VERY GOOD")]
    VeryGood,
    #[serde(rename = "EXCELLENT")]
    Excellent,
}

impl QualityLevel {
    /// Band for a score. Lower bounds are inclusive.
    pub fn from_score(xi: f64) -> Self {
        if xi >= 0.85 {
            QualityLevel::Excellent
        } else if xi >= 0.75 {
            QualityLevel::VeryGood
        } else if xi >= 0.65 {
            QualityLevel::Good
        } else if xi >= 0.50 {
            QualityLevel::Acceptable
        } else if xi >= 0.35 {
            QualityLevel::Poor
        } else {
            QualityLevel::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLevel::Critical => "CRITICAL",
            QualityLevel::Poor => "POOR",
            QualityLevel::Acceptable => "ACCEPTABLE",
            QualityLevel::Good => "GOOD",
            QualityLevel::VeryGood => "VERY GOOD",
            QualityLevel::Excellent => "EXCELLENT",
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(QualityLevel::from_score(0.85), QualityLevel::Excellent);
        assert_eq!(QualityLevel::from_score(0.849999), QualityLevel::VeryGood);
        assert_eq!(QualityLevel::from_score(0.75), QualityLevel::VeryGood);
        assert_eq!(QualityLevel::from_score(0.65), QualityLevel::Good);
        assert_eq!(QualityLevel::from_score(0.649999), QualityLevel::Acceptable);
        assert_eq!(QualityLevel::from_score(0.50), QualityLevel::Acceptable);
        assert_eq!(QualityLevel::from_score(0.35), QualityLevel::Poor);
        assert_eq!(QualityLevel::from_score(0.349999), QualityLevel::Critical);
        assert_eq!(QualityLevel::from_score(0.0), QualityLevel::Critical);
        assert_eq!(QualityLevel::from_score(1.0), QualityLevel::Excellent);
    }

    #[test]
    fn test_monotonic_over_unit_interval() {
        let mut previous = QualityLevel::from_score(0.0);
        for step in 0..=10_000 {
            let level = QualityLevel::from_score(step as f64 / 10_000.0);
            assert!(level >= previous, "level dropped at step {}", step);
            previous = level;
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(QualityLevel::VeryGood.to_string(), "VERY GOOD");
        assert_eq!(
            serde_json::to_string(&QualityLevel::Excellent).unwrap(),
            "\"EXCELLENT\""
        );
    }
}
