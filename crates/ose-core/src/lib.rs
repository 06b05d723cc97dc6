//! OSE Core: data model, error model and collaborator contracts
//!
//! Everything that more than one OSE crate needs to agree on lives here.

pub mod context;
pub mod data_model;
pub mod error;
pub mod sources;

pub use context::RequestContext;
pub use data_model::{
    Artifact, ArtifactType, Blueprint, ConsistencyModel, DeploymentTarget, IntegrationType,
    PatternSummary, PerformanceTargets, RecommendedPattern, ServiceConstraints, ServiceType,
};
pub use error::{OseError, SourceError, Violation};
pub use sources::{ArtifactSource, PatternSource};
