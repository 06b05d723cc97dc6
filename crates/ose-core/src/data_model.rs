//! Data Model: ServiceConstraints, RecommendedPattern, Artifact, Blueprint
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of service being proposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    #[default]
    Unspecified,
    #[serde(alias = "api")]
    Api,
    #[serde(alias = "event-processor", alias = "event_processor")]
    EventProcessor,
    #[serde(alias = "background-worker", alias = "background_worker")]
    BackgroundWorker,
    #[serde(alias = "stream-processor", alias = "stream_processor")]
    StreamProcessor,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Unspecified => "UNSPECIFIED",
            ServiceType::Api => "API",
            ServiceType::EventProcessor => "EVENT_PROCESSOR",
            ServiceType::BackgroundWorker => "BACKGROUND_WORKER",
            ServiceType::StreamProcessor => "STREAM_PROCESSOR",
        }
    }
}

/// Consistency guarantee the service must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsistencyModel {
    #[default]
    Unspecified,
    #[serde(alias = "strong")]
    Strong,
    #[serde(alias = "eventual")]
    Eventual,
}

impl ConsistencyModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyModel::Unspecified => "UNSPECIFIED",
            ConsistencyModel::Strong => "STRONG",
            ConsistencyModel::Eventual => "EVENTUAL",
        }
    }
}

/// Where the service will run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentTarget {
    #[default]
    Unspecified,
    #[serde(alias = "kubernetes")]
    Kubernetes,
    #[serde(alias = "ecs")]
    Ecs,
    #[serde(alias = "lambda")]
    Lambda,
}

impl DeploymentTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentTarget::Unspecified => "UNSPECIFIED",
            DeploymentTarget::Kubernetes => "KUBERNETES",
            DeploymentTarget::Ecs => "ECS",
            DeploymentTarget::Lambda => "LAMBDA",
        }
    }
}

/// External system the service talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrationType {
    #[default]
    Unspecified,
    #[serde(alias = "kafka")]
    Kafka,
    #[serde(alias = "postgresql")]
    Postgresql,
    #[serde(alias = "redis")]
    Redis,
    #[serde(alias = "elasticsearch")]
    Elasticsearch,
    #[serde(alias = "s3")]
    S3,
    #[serde(alias = "rest_api", alias = "rest-api")]
    RestApi,
    #[serde(alias = "grpc")]
    Grpc,
}

impl IntegrationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationType::Unspecified => "UNSPECIFIED",
            IntegrationType::Kafka => "KAFKA",
            IntegrationType::Postgresql => "POSTGRESQL",
            IntegrationType::Redis => "REDIS",
            IntegrationType::Elasticsearch => "ELASTICSEARCH",
            IntegrationType::S3 => "S3",
            IntegrationType::RestApi => "REST_API",
            IntegrationType::Grpc => "GRPC",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(ServiceType, ConsistencyModel, DeploymentTarget, IntegrationType, ArtifactType);

/// Requirements of a proposed service, as submitted by the caller.
///
/// Numeric fields are signed so that out-of-range input reaches the validator
/// instead of failing deserialization with an opaque message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceConstraints {
    /// DNS-label shaped name (ex: "inventory-manager")
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub service_type: ServiceType,
    /// Peak requests (or messages) per second
    #[serde(default)]
    pub throughput_tps: i64,
    /// p99 latency target in milliseconds
    #[serde(default)]
    pub latency_p99_ms: i64,
    #[serde(default)]
    pub consistency_model: ConsistencyModel,
    #[serde(default)]
    pub integrations: Vec<IntegrationType>,
    #[serde(default)]
    pub team_size: i64,
    #[serde(default)]
    pub deployment_target: DeploymentTarget,
    /// Pattern ids the caller does not want recommended
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_patterns: Vec<String>,
}

impl ServiceConstraints {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, service_type: ServiceType) -> Self {
        self.service_type = service_type;
        self
    }

    pub fn with_throughput(mut self, tps: i64) -> Self {
        self.throughput_tps = tps;
        self
    }

    pub fn with_latency(mut self, p99_ms: i64) -> Self {
        self.latency_p99_ms = p99_ms;
        self
    }

    pub fn with_consistency(mut self, model: ConsistencyModel) -> Self {
        self.consistency_model = model;
        self
    }

    pub fn with_integrations(mut self, integrations: Vec<IntegrationType>) -> Self {
        self.integrations = integrations;
        self
    }

    pub fn with_team_size(mut self, team_size: i64) -> Self {
        self.team_size = team_size;
        self
    }

    pub fn deployed_on(mut self, target: DeploymentTarget) -> Self {
        self.deployment_target = target;
        self
    }

    pub fn excluding(mut self, pattern_id: impl Into<String>) -> Self {
        self.excluded_patterns.push(pattern_id.into());
        self
    }

    pub fn is_excluded(&self, pattern_id: &str) -> bool {
        self.excluded_patterns.iter().any(|p| p == pattern_id)
    }

    pub fn has_integration(&self, integration: IntegrationType) -> bool {
        self.integrations.contains(&integration)
    }

    /// Content digest of the canonical JSON form
    pub fn digest(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        format!("blake3:{}", blake3::hash(&bytes))
    }
}

/// A pattern recommended for one blueprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedPattern {
    pub pattern_id: String,
    pub name: String,
    pub category: String,
    /// Confidence (0.0 to 1.0)
    pub confidence: f64,
    pub rationale: String,
    /// How many times the pattern has been applied before
    pub application_count: u64,
}

/// Search result entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSummary {
    pub pattern_id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub usage_count: u64,
}

impl From<RecommendedPattern> for PatternSummary {
    fn from(pattern: RecommendedPattern) -> Self {
        Self {
            pattern_id: pattern.pattern_id,
            name: pattern.name,
            category: pattern.category,
            description: pattern.rationale,
            usage_count: pattern.application_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactType {
    #[serde(alias = "proto")]
    Proto,
    #[serde(alias = "code")]
    Code,
    #[serde(alias = "config")]
    Config,
    #[serde(alias = "doc")]
    Doc,
}

impl ArtifactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Proto => "PROTO",
            ArtifactType::Code => "CODE",
            ArtifactType::Config => "CONFIG",
            ArtifactType::Doc => "DOC",
        }
    }
}

/// Generated source artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub artifact_type: ArtifactType,
    pub path: String,
    pub content: String,
    /// Language tag (ex: "protobuf", "go", "yaml", "markdown")
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceTargets {
    pub target_tps: i64,
    pub target_p99_ms: i64,
    pub target_p95_ms: i64,
    pub target_p50_ms: i64,
    pub max_error_rate: f64,
}

/// The advisory output: ranked patterns, artifacts and targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub blueprint_id: String,
    pub service_name: String,
    pub patterns: Vec<RecommendedPattern>,
    pub artifacts: Vec<Artifact>,
    pub performance_targets: PerformanceTargets,
    pub generated_at: DateTime<Utc>,
    pub constraints_digest: String,
}

impl Blueprint {
    pub fn pattern_ids(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.pattern_id.as_str()).collect()
    }
}
