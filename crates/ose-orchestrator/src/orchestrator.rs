//! Blueprint orchestration
//!
//! Sequences validation, pattern retrieval, artifact generation and target
//! computation for one request. Collaborator calls are the only suspension
//! points; each is bounded by the per-call timeout and by whatever is left of
//! the request deadline.

use crate::state::{OrchestrationState, StateTrace};
use crate::targets::performance_targets;
use chrono::Utc;
use ose_core::{
    ArtifactSource, ArtifactType, Blueprint, OseError, PatternSource, RequestContext,
    ServiceConstraints, SourceError,
};
use ose_validation::{validate_constraints, ValidationOutcome};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorTimeouts {
    /// Budget for a single collaborator call
    pub call_timeout: Duration,
    /// Budget for the whole request
    pub total_deadline: Duration,
}

impl Default for OrchestratorTimeouts {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
            total_deadline: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlueprintRequest {
    #[serde(default)]
    pub constraints: ServiceConstraints,
    /// Empty means every artifact type
    #[serde(default)]
    pub requested_artifact_types: Vec<ArtifactType>,
}

impl BlueprintRequest {
    pub fn new(constraints: ServiceConstraints) -> Self {
        Self {
            constraints,
            requested_artifact_types: Vec::new(),
        }
    }

    pub fn with_artifact_types(mut self, types: Vec<ArtifactType>) -> Self {
        self.requested_artifact_types = types;
        self
    }

    fn wants(&self, artifact_type: ArtifactType) -> bool {
        self.requested_artifact_types.is_empty()
            || self.requested_artifact_types.contains(&artifact_type)
    }
}

pub struct BlueprintOrchestrator {
    patterns: Arc<dyn PatternSource>,
    artifacts: Arc<dyn ArtifactSource>,
    timeouts: OrchestratorTimeouts,
}

impl BlueprintOrchestrator {
    pub fn new(patterns: Arc<dyn PatternSource>, artifacts: Arc<dyn ArtifactSource>) -> Self {
        Self {
            patterns,
            artifacts,
            timeouts: OrchestratorTimeouts::default(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: OrchestratorTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn timeouts(&self) -> OrchestratorTimeouts {
        self.timeouts
    }

    pub async fn generate(
        &self,
        request: &BlueprintRequest,
        ctx: &RequestContext,
    ) -> Result<Blueprint, OseError> {
        self.generate_traced(request, ctx).await.0
    }

    /// Like [`generate`](Self::generate), also returning the visited states
    pub async fn generate_traced(
        &self,
        request: &BlueprintRequest,
        ctx: &RequestContext,
    ) -> (Result<Blueprint, OseError>, StateTrace) {
        let mut trace = StateTrace::new(ctx.trace_id.clone());
        let deadline = Instant::now() + self.timeouts.total_deadline;

        let result = self.run(request, ctx, &mut trace, deadline).await;

        match &result {
            Ok(blueprint) => info!(
                trace_id = %ctx.trace_id,
                method = %ctx.method,
                elapsed_ms = ctx.elapsed_ms(),
                blueprint_id = %blueprint.blueprint_id,
                service_name = %blueprint.service_name,
                patterns = blueprint.patterns.len(),
                artifacts = blueprint.artifacts.len(),
                "blueprint generated"
            ),
            Err(err) if err.is_client_error() => debug!(
                trace_id = %ctx.trace_id,
                error = %err,
                "constraints rejected"
            ),
            Err(err) => {
                trace.fail();
                warn!(
                    trace_id = %ctx.trace_id,
                    method = %ctx.method,
                    elapsed_ms = ctx.elapsed_ms(),
                    pattern_source = self.patterns.id(),
                    artifact_source = self.artifacts.id(),
                    service_name = %request.constraints.service_name,
                    error = %err,
                    "blueprint generation failed"
                );
            }
        }

        (result, trace)
    }

    async fn run(
        &self,
        request: &BlueprintRequest,
        ctx: &RequestContext,
        trace: &mut StateTrace,
        deadline: Instant,
    ) -> Result<Blueprint, OseError> {
        let constraints = &request.constraints;

        trace.advance(OrchestrationState::Validating)?;
        if let ValidationOutcome::Invalid { class, violation } = validate_constraints(constraints) {
            trace.advance(OrchestrationState::Rejected)?;
            debug!(trace_id = %ctx.trace_id, class = %class, field = %violation.field, "validation failed");
            return Err(OseError::Validation(violation));
        }
        trace.advance(OrchestrationState::Validated)?;

        trace.advance(OrchestrationState::QueryingPatterns)?;
        let patterns = self
            .call(
                "patterns",
                self.patterns.id(),
                deadline,
                self.patterns.query(constraints),
            )
            .await?;
        let patterns: Vec<_> = patterns
            .into_iter()
            .filter(|p| !constraints.is_excluded(&p.pattern_id))
            .collect();

        trace.advance(OrchestrationState::GeneratingArtifacts)?;
        let artifacts = self
            .call(
                "artifacts",
                self.artifacts.id(),
                deadline,
                self.artifacts.generate(constraints, &patterns),
            )
            .await?;
        let artifacts: Vec<_> = artifacts
            .into_iter()
            .filter(|a| request.wants(a.artifact_type))
            .collect();

        trace.advance(OrchestrationState::ComputingTargets)?;
        let performance_targets = performance_targets(constraints);

        let blueprint = Blueprint {
            blueprint_id: blueprint_id(&constraints.service_name),
            service_name: constraints.service_name.clone(),
            patterns,
            artifacts,
            performance_targets,
            generated_at: Utc::now(),
            constraints_digest: constraints.digest(),
        };
        trace.advance(OrchestrationState::Assembled)?;
        trace.advance(OrchestrationState::Returned)?;

        Ok(blueprint)
    }

    /// Await a collaborator within `min(call_timeout, time left before deadline)`
    async fn call<T, F>(
        &self,
        stage: &'static str,
        source_id: &'static str,
        deadline: Instant,
        call: F,
    ) -> Result<T, OseError>
    where
        F: Future<Output = Result<T, SourceError>>,
    {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let budget = self.timeouts.call_timeout.min(remaining);

        match tokio::time::timeout(budget, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(OseError::Source(err)),
            Err(_) => Err(OseError::Timeout {
                stage,
                source_id,
                budget_ms: budget.as_millis() as u64,
            }),
        }
    }
}

/// `bp-<service>-<8 hex chars>`
fn blueprint_id(service_name: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("bp-{}-{}", service_name, &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blueprint_id_shape() {
        let id = blueprint_id("orders-api");
        assert!(id.starts_with("bp-orders-api-"));
        assert_eq!(id.len(), "bp-orders-api-".len() + 8);
        assert_ne!(blueprint_id("orders-api"), id);
    }

    #[test]
    fn test_requested_types_filter() {
        let all = BlueprintRequest::default();
        assert!(all.wants(ArtifactType::Doc));

        let proto_only = BlueprintRequest::default().with_artifact_types(vec![ArtifactType::Proto]);
        assert!(proto_only.wants(ArtifactType::Proto));
        assert!(!proto_only.wants(ArtifactType::Code));
    }
}
