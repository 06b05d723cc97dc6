//! Constraint validation at the trust boundary
//!
//! Checks run in a fixed order (structural, numeric, enumerated, cross-field,
//! integration) and stop at the first violation, so the same input always
//! yields the same message.

use crate::outcome::{InvariantClass, ValidationOutcome};
use once_cell::sync::Lazy;
use ose_core::{
    ConsistencyModel, DeploymentTarget, IntegrationType, ServiceConstraints, ServiceType,
    Violation,
};
use regex::Regex;

/// DNS-label body: lowercase start, then lowercase, digits or hyphens
static SERVICE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").unwrap());

pub const MIN_SERVICE_NAME_LEN: usize = 3;
pub const MAX_SERVICE_NAME_LEN: usize = 63;
pub const MAX_THROUGHPUT_TPS: i64 = 1_000_000;
pub const MAX_LATENCY_P99_MS: i64 = 60_000;
/// Floor imposed by atomic-commit coordination overhead
pub const STRONG_CONSISTENCY_MIN_LATENCY_MS: i64 = 50;
/// Highest sustained rate assumed for serverless execution units
pub const LAMBDA_MAX_THROUGHPUT_TPS: i64 = 10_000;
pub const MAX_INTEGRATIONS: usize = 10;

type Check = fn(&ServiceConstraints) -> Option<Violation>;

const CHECKS: [(InvariantClass, Check); 5] = [
    (InvariantClass::Structural, check_structure),
    (InvariantClass::Numeric, check_numeric),
    (InvariantClass::Enumerated, check_enumerations),
    (InvariantClass::CrossField, check_cross_field),
    (InvariantClass::Integration, check_integrations),
];

/// Validate a constraint object, returning the first violated invariant
pub fn validate_constraints(constraints: &ServiceConstraints) -> ValidationOutcome {
    for (class, check) in CHECKS {
        if let Some(violation) = check(constraints) {
            return ValidationOutcome::invalid(class, violation);
        }
    }
    ValidationOutcome::Valid
}

fn check_structure(c: &ServiceConstraints) -> Option<Violation> {
    let name = c.service_name.as_str();

    if name.is_empty() {
        return Some(Violation::new(
            "service_name",
            "service name is required",
            "Use a concise, descriptive name like 'inventory-manager' or 'payment-processor'",
        ));
    }

    if name.len() < MIN_SERVICE_NAME_LEN || name.len() > MAX_SERVICE_NAME_LEN {
        return Some(Violation::new(
            "service_name",
            format!(
                "service name must be {}-{} characters, got {}",
                MIN_SERVICE_NAME_LEN,
                MAX_SERVICE_NAME_LEN,
                name.len()
            ),
            "Use a concise, descriptive name like 'inventory-manager' or 'payment-processor'",
        ));
    }

    if !SERVICE_NAME.is_match(name) {
        return Some(Violation::new(
            "service_name",
            "service name must be lowercase letters, numbers, and hyphens only (DNS-compatible)",
            format!("Try: {}", suggest_service_name(name)),
        ));
    }

    None
}

fn check_numeric(c: &ServiceConstraints) -> Option<Violation> {
    if c.throughput_tps <= 0 {
        return Some(Violation::new(
            "throughput_tps",
            "throughput must be positive",
            "Specify expected peak requests/messages per second (e.g., 1000 for typical API)",
        ));
    }

    if c.throughput_tps > MAX_THROUGHPUT_TPS {
        return Some(Violation::new(
            "throughput_tps",
            format!(
                "throughput {} TPS exceeds reasonable maximum (1M TPS)",
                c.throughput_tps
            ),
            "Split the workload across services or request specialized architecture guidance",
        ));
    }

    if c.latency_p99_ms <= 0 {
        return Some(Violation::new(
            "latency_p99_ms",
            "latency target must be positive",
            "Specify p99 latency target in milliseconds (e.g., 100 for typical API)",
        ));
    }

    if c.latency_p99_ms > MAX_LATENCY_P99_MS {
        return Some(Violation::new(
            "latency_p99_ms",
            format!("latency target {}ms exceeds 60 seconds", c.latency_p99_ms),
            "For batch jobs with >60s latency, consider service type BACKGROUND_WORKER",
        ));
    }

    if c.team_size <= 0 {
        return Some(Violation::new(
            "team_size",
            "team size must be positive",
            "Specify how many engineers will own the service (e.g., 3)",
        ));
    }

    None
}

fn check_enumerations(c: &ServiceConstraints) -> Option<Violation> {
    if c.service_type == ServiceType::Unspecified {
        return Some(Violation::new(
            "service_type",
            "service type must be specified",
            "Choose: API, EVENT_PROCESSOR, BACKGROUND_WORKER, or STREAM_PROCESSOR",
        ));
    }

    if c.consistency_model == ConsistencyModel::Unspecified {
        return Some(Violation::new(
            "consistency_model",
            "consistency model must be specified",
            "Choose STRONG (ACID transactions) or EVENTUAL (BASE properties)",
        ));
    }

    if c.deployment_target == DeploymentTarget::Unspecified {
        return Some(Violation::new(
            "deployment_target",
            "deployment target must be specified",
            "Choose: KUBERNETES, ECS, or LAMBDA",
        ));
    }

    None
}

fn check_cross_field(c: &ServiceConstraints) -> Option<Violation> {
    if c.consistency_model == ConsistencyModel::Strong
        && c.latency_p99_ms < STRONG_CONSISTENCY_MIN_LATENCY_MS
    {
        return Some(Violation::new(
            "latency_p99_ms",
            "strong consistency requires minimum 50ms latency (ACID coordination overhead)",
            "Either increase latency target to >=50ms or use eventual consistency",
        ));
    }

    if c.throughput_tps > LAMBDA_MAX_THROUGHPUT_TPS
        && c.deployment_target == DeploymentTarget::Lambda
    {
        return Some(Violation::new(
            "deployment_target",
            "Lambda is not suitable for >10K TPS sustained throughput",
            "Use KUBERNETES for high-throughput services",
        ));
    }

    None
}

fn check_integrations(c: &ServiceConstraints) -> Option<Violation> {
    if c.integrations.len() > MAX_INTEGRATIONS {
        return Some(Violation::new(
            "integrations",
            format!(
                "service declares {} integrations (max {})",
                c.integrations.len(),
                MAX_INTEGRATIONS
            ),
            "Services with more than 10 dependencies likely violate single responsibility; split the service",
        ));
    }

    if c.integrations.contains(&IntegrationType::Unspecified) {
        return Some(Violation::new(
            "integrations",
            "integration type UNSPECIFIED is not allowed",
            "Specify concrete integration types (KAFKA, POSTGRESQL, etc.)",
        ));
    }

    None
}

/// Best-effort DNS-label rendering of a rejected name
fn suggest_service_name(name: &str) -> String {
    name.to_lowercase().replace(['_', ' ', '.'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory_manager() -> ServiceConstraints {
        ServiceConstraints::new("inventory-manager")
            .with_type(ServiceType::Api)
            .with_throughput(500)
            .with_latency(200)
            .with_consistency(ConsistencyModel::Eventual)
            .with_integrations(vec![
                IntegrationType::Kafka,
                IntegrationType::Postgresql,
                IntegrationType::Redis,
            ])
            .with_team_size(3)
            .deployed_on(DeploymentTarget::Kubernetes)
    }

    fn field_of(outcome: &ValidationOutcome) -> &str {
        outcome.violation().map(|v| v.field.as_str()).unwrap_or("")
    }

    #[test]
    fn test_reference_constraints_are_valid() {
        assert!(validate_constraints(&inventory_manager()).is_valid());
    }

    #[test]
    fn test_service_name_rules() {
        for (name, expected_msg) in [
            ("", "required"),
            ("ab", "3-63"),
            ("Inventory_Manager", "lowercase"),
            ("9lives", "lowercase"),
            ("-svc", "lowercase"),
        ] {
            let mut c = inventory_manager();
            c.service_name = name.to_string();
            let outcome = validate_constraints(&c);
            assert_eq!(field_of(&outcome), "service_name", "name {:?}", name);
            assert!(
                outcome.violation().unwrap().message.contains(expected_msg),
                "name {:?}",
                name
            );
        }

        let mut c = inventory_manager();
        c.service_name = "a".repeat(63);
        assert!(validate_constraints(&c).is_valid());
        c.service_name = "a".repeat(64);
        assert_eq!(field_of(&validate_constraints(&c)), "service_name");
    }

    #[test]
    fn test_name_suggestion() {
        let mut c = inventory_manager();
        c.service_name = "Inventory_Manager".to_string();
        let outcome = validate_constraints(&c);
        assert_eq!(outcome.violation().unwrap().suggestion, "Try: inventory-manager");
    }

    #[test]
    fn test_numeric_bounds() {
        let mut c = inventory_manager().with_throughput(1_000_000);
        assert!(validate_constraints(&c).is_valid());
        c = c.with_throughput(1_000_001);
        assert_eq!(field_of(&validate_constraints(&c)), "throughput_tps");
        c = c.with_throughput(0);
        assert_eq!(field_of(&validate_constraints(&c)), "throughput_tps");

        let mut c = inventory_manager().with_latency(60_000);
        assert!(validate_constraints(&c).is_valid());
        c = c.with_latency(60_001);
        assert_eq!(field_of(&validate_constraints(&c)), "latency_p99_ms");
        c = c.with_latency(-5);
        assert_eq!(field_of(&validate_constraints(&c)), "latency_p99_ms");

        let c = inventory_manager().with_team_size(0);
        assert_eq!(field_of(&validate_constraints(&c)), "team_size");
    }

    #[test]
    fn test_enumerations_must_be_specified() {
        let c = inventory_manager().with_type(ServiceType::Unspecified);
        assert_eq!(field_of(&validate_constraints(&c)), "service_type");

        let c = inventory_manager().with_consistency(ConsistencyModel::Unspecified);
        assert_eq!(field_of(&validate_constraints(&c)), "consistency_model");

        let c = inventory_manager().deployed_on(DeploymentTarget::Unspecified);
        assert_eq!(field_of(&validate_constraints(&c)), "deployment_target");
    }

    #[test]
    fn test_strong_consistency_latency_floor() {
        let strong = inventory_manager().with_consistency(ConsistencyModel::Strong);

        let outcome = validate_constraints(&strong.clone().with_latency(49));
        assert_eq!(outcome.class(), Some(InvariantClass::CrossField));
        assert_eq!(field_of(&outcome), "latency_p99_ms");

        assert!(validate_constraints(&strong.clone().with_latency(50)).is_valid());
        assert!(validate_constraints(&strong.with_latency(51)).is_valid());

        // eventual consistency has no floor
        assert!(validate_constraints(&inventory_manager().with_latency(1)).is_valid());
    }

    #[test]
    fn test_lambda_throughput_ceiling() {
        let lambda = inventory_manager().deployed_on(DeploymentTarget::Lambda);
        assert!(validate_constraints(&lambda.clone().with_throughput(10_000)).is_valid());

        let outcome = validate_constraints(&lambda.with_throughput(10_001));
        assert_eq!(outcome.class(), Some(InvariantClass::CrossField));
        assert_eq!(field_of(&outcome), "deployment_target");

        let ecs = inventory_manager()
            .deployed_on(DeploymentTarget::Ecs)
            .with_throughput(50_000);
        assert!(validate_constraints(&ecs).is_valid());
    }

    #[test]
    fn test_integration_set() {
        let c = inventory_manager().with_integrations(vec![IntegrationType::Kafka; 10]);
        assert!(validate_constraints(&c).is_valid());

        let c = inventory_manager().with_integrations(vec![IntegrationType::Kafka; 11]);
        let outcome = validate_constraints(&c);
        assert_eq!(outcome.class(), Some(InvariantClass::Integration));
        assert!(outcome.violation().unwrap().message.contains("11"));

        let c = inventory_manager()
            .with_integrations(vec![IntegrationType::Redis, IntegrationType::Unspecified]);
        assert_eq!(field_of(&validate_constraints(&c)), "integrations");

        let c = inventory_manager().with_integrations(vec![]);
        assert!(validate_constraints(&c).is_valid());
    }

    #[test]
    fn test_every_violation_has_suggestion() {
        let broken = vec![
            ServiceConstraints::default(),
            inventory_manager().with_throughput(-1),
            inventory_manager().with_latency(0),
            inventory_manager().with_type(ServiceType::Unspecified),
            inventory_manager()
                .with_consistency(ConsistencyModel::Strong)
                .with_latency(10),
            inventory_manager().with_integrations(vec![IntegrationType::Unspecified]),
        ];

        for c in broken {
            let outcome = validate_constraints(&c);
            let violation = outcome.violation().expect("expected a violation");
            assert!(!violation.suggestion.is_empty(), "{:?}", violation);
        }
    }
}
