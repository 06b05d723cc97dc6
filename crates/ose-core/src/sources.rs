//! Collaborator contracts consumed by the orchestrator
use crate::data_model::{Artifact, PatternSummary, RecommendedPattern, ServiceConstraints};
use crate::error::SourceError;
use async_trait::async_trait;

/// Turns constraints into ranked patterns.
///
/// Implementations may be backed by a graph store, a relational store or an
/// in-memory catalog; the orchestrator treats them as black boxes behind a
/// timeout.
#[async_trait]
pub trait PatternSource: Send + Sync {
    /// Stable identifier used in logs and error messages
    fn id(&self) -> &'static str;

    /// Ranked patterns for a validated constraint set
    async fn query(
        &self,
        constraints: &ServiceConstraints,
    ) -> Result<Vec<RecommendedPattern>, SourceError>;

    /// Free-text search over the known patterns
    async fn search(&self, text: &str, top_k: usize) -> Result<Vec<PatternSummary>, SourceError>;
}

/// Turns constraints plus chosen patterns into source artifacts
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    fn id(&self) -> &'static str;

    async fn generate(
        &self,
        constraints: &ServiceConstraints,
        patterns: &[RecommendedPattern],
    ) -> Result<Vec<Artifact>, SourceError>;
}
