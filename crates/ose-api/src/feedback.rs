//! RegisterService: turn post-deployment feedback into a quality score and
//! fold it into pattern confidence.
//!
//! Each of the three dimensions may be reported directly or derived from raw
//! data. A dimension with neither is a client error.

use crate::error::ApiError;
use ose_confidence::{ConfidenceStore, Observation, ObservationLog, PatternConfidence};
use ose_quality::{actionability, impact, relevance, Incident, QualityLevel, QualityScore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationStats {
    pub lines_generated: u64,
    pub lines_modified: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceData {
    pub met_targets: u32,
    pub total_targets: u32,
    #[serde(default)]
    pub incidents: Vec<Incident>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterServiceRequest {
    #[serde(default)]
    pub blueprint_id: String,
    #[serde(default)]
    pub patterns_applied: Vec<String>,
    /// Size of the recommendation the applied patterns were picked from
    #[serde(default)]
    pub patterns_recommended: Option<u32>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub actionability_score: Option<f64>,
    #[serde(default)]
    pub impact_score: Option<f64>,
    #[serde(default)]
    pub modification_stats: Option<ModificationStats>,
    #[serde(default)]
    pub performance_data: Option<PerformanceData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterServiceResponse {
    pub success: bool,
    pub message: String,
    pub overall_score: f64,
    pub quality_level: QualityLevel,
    pub score: QualityScore,
    pub updated_confidences: Vec<PatternConfidence>,
}

/// Applied pattern ids with duplicates removed, first occurrence wins
fn distinct_patterns(patterns: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty() && seen.insert(p.to_string()))
        .map(str::to_string)
        .collect()
}

/// Current confidence of each applied pattern. Any id the store has never
/// seen rejects the whole registration.
fn applied_confidences(applied: &[String], store: &ConfidenceStore) -> Result<Vec<f64>, ApiError> {
    applied
        .iter()
        .map(|id| {
            store
                .confidence(id)
                .ok_or_else(|| ApiError::unknown_pattern(id))
        })
        .collect()
}

/// Compute the quality score for one registration.
///
/// Relevance falls back to the mean of `confidences`, the applied patterns'
/// confidence read before this registration updates them.
pub fn score_registration(
    request: &RegisterServiceRequest,
    confidences: &[f64],
) -> Result<QualityScore, ApiError> {
    let relevance_score = match request.relevance_score {
        Some(score) => score,
        None => {
            let recommended = request.patterns_recommended.ok_or_else(|| {
                ApiError::invalid(
                    "relevance_score",
                    "relevance_score is missing and cannot be derived",
                    "Report relevance_score, or patterns_recommended alongside patterns_applied",
                )
            })?;

            let avg_confidence = if confidences.is_empty() {
                0.0
            } else {
                confidences.iter().sum::<f64>() / confidences.len() as f64
            };

            let applied_count = u32::try_from(confidences.len()).unwrap_or(u32::MAX);
            relevance(applied_count, recommended, avg_confidence)?
        }
    };

    let actionability_score = match (request.actionability_score, request.modification_stats) {
        (Some(score), _) => score,
        (None, Some(stats)) => actionability(stats.lines_modified, stats.lines_generated),
        (None, None) => {
            return Err(ApiError::invalid(
                "actionability_score",
                "actionability_score is missing and cannot be derived",
                "Report actionability_score, or modification_stats with lines_generated and lines_modified",
            ))
        }
    };

    let impact_score = match (request.impact_score, &request.performance_data) {
        (Some(score), _) => score,
        (None, Some(data)) => impact(data.met_targets, data.total_targets, &data.incidents)?,
        (None, None) => {
            return Err(ApiError::invalid(
                "impact_score",
                "impact_score is missing and cannot be derived",
                "Report impact_score, or performance_data with met_targets and total_targets",
            ))
        }
    };

    Ok(QualityScore::calculate(
        relevance_score,
        actionability_score,
        impact_score,
    )?)
}

/// Score a registration and fold the result into every applied pattern
pub fn register(
    request: &RegisterServiceRequest,
    store: &ConfidenceStore,
    observations: &ObservationLog,
) -> Result<RegisterServiceResponse, ApiError> {
    let blueprint_id = request.blueprint_id.trim();
    if blueprint_id.is_empty() {
        return Err(ApiError::invalid(
            "blueprint_id",
            "blueprint_id is required",
            "Use the blueprint_id returned by GenerateBlueprint",
        ));
    }

    let applied = distinct_patterns(&request.patterns_applied);
    let confidences = applied_confidences(&applied, store)?;
    let score = score_registration(request, &confidences)?;

    let mut updated_confidences = Vec::with_capacity(applied.len());
    for pattern_id in &applied {
        updated_confidences.push(store.apply(pattern_id, score.overall)?);
    }

    observations.record(Observation::new(blueprint_id, applied.iter().cloned(), score.overall));

    let level = score.level();
    info!(
        blueprint_id = %blueprint_id,
        overall_score = score.overall,
        quality_level = %level,
        patterns = applied.len(),
        "service registered"
    );

    Ok(RegisterServiceResponse {
        success: true,
        message: format!("Service registered. {}", score),
        overall_score: score.overall,
        quality_level: level,
        score,
        updated_confidences,
    })
}
