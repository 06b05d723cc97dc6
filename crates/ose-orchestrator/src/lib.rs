//! OSE Orchestrator: from constraints to blueprint
//!
//! # Flow
//!
//! ```text
//! Received → Validating → Validated → QueryingPatterns → GeneratingArtifacts
//!                ↓                          ↓                    ↓
//!            Rejected                    Failed               Failed
//!
//! GeneratingArtifacts → ComputingTargets → Assembled → Returned
//! ```
//!
//! A rejection is the caller's problem and surfaces as a validation error.
//! A collaborator error or timeout moves the request to Failed and surfaces
//! as a server error.

pub mod orchestrator;
pub mod state;
pub mod targets;

pub use orchestrator::{BlueprintOrchestrator, BlueprintRequest, OrchestratorTimeouts};
pub use state::{OrchestrationState, StateTrace, Transition};
pub use targets::{performance_targets, MAX_ERROR_RATE};
