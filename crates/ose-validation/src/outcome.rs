//! Outcome types for constraint validation
//!
//! Validation is fail-fast: an outcome is either valid or carries exactly one
//! violation, tagged with the invariant class that produced it.

use ose_core::Violation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Invariant classes, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvariantClass {
    Structural = 1,
    Numeric = 2,
    Enumerated = 3,
    CrossField = 4,
    Integration = 5,
}

impl InvariantClass {
    /// All classes in the order they are checked
    pub const ORDER: [InvariantClass; 5] = [
        InvariantClass::Structural,
        InvariantClass::Numeric,
        InvariantClass::Enumerated,
        InvariantClass::CrossField,
        InvariantClass::Integration,
    ];
}

impl fmt::Display for InvariantClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InvariantClass::Structural => write!(f, "STRUCTURAL"),
            InvariantClass::Numeric => write!(f, "NUMERIC"),
            InvariantClass::Enumerated => write!(f, "ENUMERATED"),
            InvariantClass::CrossField => write!(f, "CROSS_FIELD"),
            InvariantClass::Integration => write!(f, "INTEGRATION"),
        }
    }
}

/// The result of validating one constraint object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationOutcome {
    Valid,

    Invalid {
        class: InvariantClass,
        violation: Violation,
    },
}

impl ValidationOutcome {
    pub fn invalid(class: InvariantClass, violation: Violation) -> Self {
        ValidationOutcome::Invalid { class, violation }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// The violation, if any
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            ValidationOutcome::Invalid { violation, .. } => Some(violation),
            ValidationOutcome::Valid => None,
        }
    }

    pub fn class(&self) -> Option<InvariantClass> {
        match self {
            ValidationOutcome::Invalid { class, .. } => Some(*class),
            ValidationOutcome::Valid => None,
        }
    }

    pub fn into_result(self) -> Result<(), Violation> {
        match self {
            ValidationOutcome::Valid => Ok(()),
            ValidationOutcome::Invalid { violation, .. } => Err(violation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let valid = ValidationOutcome::Valid;
        assert!(valid.is_valid());
        assert!(valid.violation().is_none());
        assert!(valid.into_result().is_ok());

        let invalid = ValidationOutcome::invalid(
            InvariantClass::Numeric,
            Violation::new("throughput_tps", "throughput must be positive", "Specify peak TPS"),
        );
        assert!(!invalid.is_valid());
        assert_eq!(invalid.class(), Some(InvariantClass::Numeric));
        assert_eq!(invalid.violation().unwrap().field, "throughput_tps");
    }

    #[test]
    fn test_class_order() {
        let mut sorted = InvariantClass::ORDER;
        sorted.sort();
        assert_eq!(sorted, InvariantClass::ORDER);
    }

    #[test]
    fn test_outcome_serialization() {
        let invalid = ValidationOutcome::invalid(
            InvariantClass::CrossField,
            Violation::new("deployment_target", "m", "s"),
        );
        let json = serde_json::to_value(&invalid).unwrap();
        assert_eq!(json["type"], "INVALID");
        assert_eq!(json["class"], "CROSS_FIELD");
        assert_eq!(json["violation"]["field"], "deployment_target");
    }
}
