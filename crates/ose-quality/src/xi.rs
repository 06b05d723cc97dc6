//! The Xi quality function
//!
//! Three independent dimensions, each in [0, 1]:
//!
//! - relevance (R): share of recommended patterns applied, weighted by their confidence
//! - actionability (A): how little of the generated code had to be rewritten
//! - impact (I): share of performance targets met, discounted by incidents
//!
//! The overall score is the geometric mean `(R * A * I)^(1/3)`. A near-zero
//! dimension collapses the composite no matter how good the other two are.

use crate::incident::{stability_factor, Incident};
use crate::level::QualityLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("{field} must be in [0.0, 1.0], got {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("{field} is not a finite number")]
    NotFinite { field: &'static str },

    #[error("invalid pattern counts: applied={applied}, recommended={recommended}")]
    PatternCounts { applied: u32, recommended: u32 },

    #[error("total_targets must be > 0")]
    NoTargets,

    #[error("invalid target counts: met={met}, total={total}")]
    TargetCounts { met: u32, total: u32 },
}

impl ScoreError {
    /// Request field the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            ScoreError::OutOfRange { field, .. } | ScoreError::NotFinite { field } => field,
            ScoreError::PatternCounts { .. } => "patterns_applied",
            ScoreError::NoTargets | ScoreError::TargetCounts { .. } => "performance_data",
        }
    }

    pub fn suggestion(&self) -> &'static str {
        match self {
            ScoreError::OutOfRange { .. } | ScoreError::NotFinite { .. } => {
                "Report every score as a finite number between 0.0 and 1.0"
            }
            ScoreError::PatternCounts { .. } => {
                "Only report patterns that were part of the blueprint's recommendation"
            }
            ScoreError::NoTargets => "Report at least one performance target",
            ScoreError::TargetCounts { .. } => {
                "met_targets must be between 0 and total_targets"
            }
        }
    }
}

/// One Xi observation. Computed once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    pub relevance: f64,
    pub actionability: f64,
    pub impact: f64,
    pub overall: f64,
}

impl QualityScore {
    /// Combine three dimensions into the geometric mean
    pub fn calculate(relevance: f64, actionability: f64, impact: f64) -> Result<Self, ScoreError> {
        check_unit("relevance_score", relevance)?;
        check_unit("actionability_score", actionability)?;
        check_unit("impact_score", impact)?;

        let overall = (relevance * actionability * impact).powf(1.0 / 3.0);

        Ok(Self {
            relevance,
            actionability,
            impact,
            overall,
        })
    }

    pub fn level(&self) -> QualityLevel {
        QualityLevel::from_score(self.overall)
    }
}

impl fmt::Display for QualityScore {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Ξ={:.3} ({}) [R={:.3}, A={:.3}, I={:.3}]",
            self.overall,
            self.level(),
            self.relevance,
            self.actionability,
            self.impact
        )
    }
}

/// Relevance: `(applied / recommended) * avg_confidence`.
///
/// Nothing recommended means nothing to fail at, so the result is 1.0
/// before any other argument is looked at.
pub fn relevance(applied: u32, recommended: u32, avg_confidence: f64) -> Result<f64, ScoreError> {
    if recommended == 0 {
        return Ok(1.0);
    }

    if applied > recommended {
        return Err(ScoreError::PatternCounts {
            applied,
            recommended,
        });
    }

    check_unit("avg_confidence", avg_confidence)?;

    Ok(applied as f64 / recommended as f64 * avg_confidence)
}

/// Actionability: `max(0, 1 - sqrt(modified / generated))`, 1.0 when nothing was generated
pub fn actionability(lines_modified: u64, lines_generated: u64) -> f64 {
    if lines_generated == 0 {
        return 1.0;
    }

    let rate = lines_modified as f64 / lines_generated as f64;
    (1.0 - rate.sqrt()).max(0.0)
}

/// Impact: `(met / total) * stability_factor(incidents)`
pub fn impact(met_targets: u32, total_targets: u32, incidents: &[Incident]) -> Result<f64, ScoreError> {
    if total_targets == 0 {
        return Err(ScoreError::NoTargets);
    }

    if met_targets > total_targets {
        return Err(ScoreError::TargetCounts {
            met: met_targets,
            total: total_targets,
        });
    }

    let target_rate = met_targets as f64 / total_targets as f64;
    Ok(target_rate * stability_factor(incidents))
}

fn check_unit(field: &'static str, value: f64) -> Result<(), ScoreError> {
    if !value.is_finite() {
        return Err(ScoreError::NotFinite { field });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(ScoreError::OutOfRange { field, value });
    }
    Ok(())
}
