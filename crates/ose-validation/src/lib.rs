//! OSE Validation: constraint checks at the trust boundary
//!
//! Every client-supplied constraint object passes through
//! [`validate_constraints`] before any collaborator sees it. Checks are
//! grouped into invariant classes evaluated in a fixed order:
//!
//! ```text
//! STRUCTURAL → NUMERIC → ENUMERATED → CROSS_FIELD → INTEGRATION
//! ```
//!
//! The first failing check wins and the outcome carries one violation with a
//! suggestion the caller can act on.
//!
//! # Example
//!
//! ```
//! use ose_core::{ConsistencyModel, DeploymentTarget, ServiceConstraints, ServiceType};
//! use ose_validation::{validate_constraints, InvariantClass};
//!
//! let constraints = ServiceConstraints::new("orders-api")
//!     .with_type(ServiceType::Api)
//!     .with_throughput(200)
//!     .with_latency(20)
//!     .with_consistency(ConsistencyModel::Strong)
//!     .with_team_size(2)
//!     .deployed_on(DeploymentTarget::Kubernetes);
//!
//! let outcome = validate_constraints(&constraints);
//! assert_eq!(outcome.class(), Some(InvariantClass::CrossField));
//! println!("{}", outcome.violation().unwrap());
//! ```

pub mod constraints;
pub mod outcome;

pub use constraints::{
    validate_constraints, LAMBDA_MAX_THROUGHPUT_TPS, MAX_INTEGRATIONS, MAX_LATENCY_P99_MS,
    MAX_SERVICE_NAME_LEN, MAX_THROUGHPUT_TPS, MIN_SERVICE_NAME_LEN,
    STRONG_CONSISTENCY_MIN_LATENCY_MS,
};
pub use outcome::{InvariantClass, ValidationOutcome};
