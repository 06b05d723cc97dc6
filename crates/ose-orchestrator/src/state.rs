//! Per-request orchestration state machine

use ose_core::OseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrchestrationState {
    Received,
    Validating,
    Validated,
    Rejected,
    QueryingPatterns,
    GeneratingArtifacts,
    ComputingTargets,
    Assembled,
    Returned,
    Failed,
}

impl OrchestrationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrchestrationState::Received => "RECEIVED",
            OrchestrationState::Validating => "VALIDATING",
            OrchestrationState::Validated => "VALIDATED",
            OrchestrationState::Rejected => "REJECTED",
            OrchestrationState::QueryingPatterns => "QUERYING_PATTERNS",
            OrchestrationState::GeneratingArtifacts => "GENERATING_ARTIFACTS",
            OrchestrationState::ComputingTargets => "COMPUTING_TARGETS",
            OrchestrationState::Assembled => "ASSEMBLED",
            OrchestrationState::Returned => "RETURNED",
            OrchestrationState::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrchestrationState::Rejected | OrchestrationState::Returned | OrchestrationState::Failed
        )
    }

    /// Legal edges. Failed is reachable from every state after validation.
    pub fn can_transition_to(&self, next: OrchestrationState) -> bool {
        use OrchestrationState::*;

        match (self, next) {
            (Received, Validating) => true,
            (Validating, Validated) | (Validating, Rejected) => true,
            (Validated, QueryingPatterns) => true,
            (QueryingPatterns, GeneratingArtifacts) => true,
            (GeneratingArtifacts, ComputingTargets) => true,
            (ComputingTargets, Assembled) => true,
            (Assembled, Returned) => true,
            (
                Validated | QueryingPatterns | GeneratingArtifacts | ComputingTargets | Assembled,
                Failed,
            ) => true,
            _ => false,
        }
    }
}

impl fmt::Display for OrchestrationState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: OrchestrationState,
    pub to: OrchestrationState,
    /// Milliseconds since the request was received
    pub elapsed_ms: u64,
}

/// Ordered record of the states one request went through
#[derive(Debug, Clone)]
pub struct StateTrace {
    trace_id: String,
    current: OrchestrationState,
    transitions: Vec<Transition>,
    started: Instant,
}

impl StateTrace {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            current: OrchestrationState::Received,
            transitions: Vec::new(),
            started: Instant::now(),
        }
    }

    pub fn current(&self) -> OrchestrationState {
        self.current
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// States visited so far, starting with Received
    pub fn path(&self) -> Vec<OrchestrationState> {
        std::iter::once(OrchestrationState::Received)
            .chain(self.transitions.iter().map(|t| t.to))
            .collect()
    }

    pub fn advance(&mut self, next: OrchestrationState) -> Result<(), OseError> {
        if !self.current.can_transition_to(next) {
            return Err(OseError::State(format!(
                "illegal transition {} -> {}",
                self.current, next
            )));
        }
        self.record(next);
        Ok(())
    }

    /// Move to Failed from wherever the request stopped, unless it already ended
    pub fn fail(&mut self) {
        if !self.current.is_terminal() {
            self.record(OrchestrationState::Failed);
        }
    }

    fn record(&mut self, next: OrchestrationState) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        debug!(
            trace_id = %self.trace_id,
            from = %self.current,
            to = %next,
            elapsed_ms = elapsed_ms,
            "orchestration transition"
        );
        self.transitions.push(Transition {
            from: self.current,
            to: next,
            elapsed_ms,
        });
        self.current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrchestrationState::*;

    #[test]
    fn test_happy_path_is_legal() {
        let mut trace = StateTrace::new("t-1");
        for next in [
            Validating,
            Validated,
            QueryingPatterns,
            GeneratingArtifacts,
            ComputingTargets,
            Assembled,
            Returned,
        ] {
            trace.advance(next).unwrap();
        }
        assert_eq!(trace.current(), Returned);
        assert_eq!(trace.transitions().len(), 7);
        assert_eq!(trace.path().first(), Some(&Received));
    }

    #[test]
    fn test_illegal_transitions() {
        let mut trace = StateTrace::new("t-2");
        assert!(matches!(trace.advance(QueryingPatterns), Err(OseError::State(_))));
        assert!(!Validating.can_transition_to(Failed));
        assert!(!Rejected.can_transition_to(Validated));
        assert!(!Returned.can_transition_to(Failed));
        assert_eq!(trace.current(), Received);
    }

    #[test]
    fn test_failed_reachable_after_validation() {
        for state in [Validated, QueryingPatterns, GeneratingArtifacts, ComputingTargets, Assembled] {
            assert!(state.can_transition_to(Failed), "{}", state);
        }
    }

    #[test]
    fn test_fail_is_noop_on_terminal() {
        let mut trace = StateTrace::new("t-3");
        trace.advance(Validating).unwrap();
        trace.advance(Rejected).unwrap();
        trace.fail();
        assert_eq!(trace.current(), Rejected);
        assert_eq!(trace.transitions().len(), 2);
    }
}
