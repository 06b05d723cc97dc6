//! Pattern catalog loaded from YAML
use ose_core::{ConsistencyModel, DeploymentTarget, IntegrationType, ServiceConstraints, ServiceType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

static EMBEDDED_CATALOG: &str = include_str!("../catalog/patterns.yaml");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid catalog entry {id}: {reason}")]
    Invalid { id: String, reason: String },
}

/// One condition set. Every non-empty list must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Applicability {
    #[serde(default)]
    pub service_types: Vec<ServiceType>,
    #[serde(default)]
    pub consistency_models: Vec<ConsistencyModel>,
    /// Matches when the service declares at least one of these
    #[serde(default)]
    pub integrations: Vec<IntegrationType>,
    #[serde(default)]
    pub deployment_targets: Vec<DeploymentTarget>,
    #[serde(default)]
    pub min_throughput_tps: i64,
}

impl Applicability {
    pub fn matches(&self, c: &ServiceConstraints) -> bool {
        (self.service_types.is_empty() || self.service_types.contains(&c.service_type))
            && (self.consistency_models.is_empty()
                || self.consistency_models.contains(&c.consistency_model))
            && (self.integrations.is_empty()
                || self.integrations.iter().any(|i| c.has_integration(*i)))
            && (self.deployment_targets.is_empty()
                || self.deployment_targets.contains(&c.deployment_target))
            && c.throughput_tps >= self.min_throughput_tps
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub rationale: String,
    /// Prior confidence before any feedback
    pub confidence: f64,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Any matching entry makes the pattern applicable
    #[serde(default)]
    pub applies_when: Vec<Applicability>,
}

impl CatalogEntry {
    pub fn applies_to(&self, c: &ServiceConstraints) -> bool {
        self.applies_when.is_empty() || self.applies_when.iter().any(|a| a.matches(c))
    }

    /// Lowercased text searched by keyword queries
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.id,
            self.name,
            self.category,
            self.description,
            self.tags.join(" ")
        )
        .to_lowercase()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    patterns: Vec<CatalogEntry>,
}

#[derive(Debug, Clone)]
pub struct PatternCatalog {
    entries: Vec<CatalogEntry>,
}

impl PatternCatalog {
    /// The catalog compiled into the binary
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_yaml(EMBEDDED_CATALOG)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;
        Self::from_entries(file.patterns)
    }

    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();

        for entry in &entries {
            let invalid = |reason: &str| CatalogError::Invalid {
                id: entry.id.clone(),
                reason: reason.to_string(),
            };

            if entry.id.trim().is_empty() {
                return Err(invalid("pattern id is empty"));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(invalid("duplicate pattern id"));
            }
            if !entry.confidence.is_finite() || !(0.0..=1.0).contains(&entry.confidence) {
                return Err(invalid("confidence must be in [0.0, 1.0]"));
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = PatternCatalog::embedded().unwrap();
        assert!(catalog.len() >= 10);
        assert_eq!(catalog.get("rest-api-v1").unwrap().confidence, 0.92);
        assert_eq!(catalog.get("backpressure-v1").unwrap().category, "Flow Control");
    }

    #[test]
    fn test_applicability_requires_every_listed_field() {
        let rule = Applicability {
            deployment_targets: vec![DeploymentTarget::Kubernetes],
            min_throughput_tps: 1000,
            ..Default::default()
        };
        let c = ServiceConstraints::new("svc").deployed_on(DeploymentTarget::Kubernetes);

        assert!(!rule.matches(&c.clone().with_throughput(999)));
        assert!(rule.matches(&c.clone().with_throughput(1000)));
        assert!(!rule.matches(&c.deployed_on(DeploymentTarget::Lambda).with_throughput(5000)));
    }

    #[test]
    fn test_integration_match_is_any_of() {
        let rule = Applicability {
            integrations: vec![IntegrationType::RestApi, IntegrationType::Grpc],
            ..Default::default()
        };
        let c = ServiceConstraints::new("svc")
            .with_integrations(vec![IntegrationType::Redis, IntegrationType::Grpc]);
        assert!(rule.matches(&c));
        assert!(!rule.matches(&ServiceConstraints::new("svc")));
    }

    #[test]
    fn test_rejects_bad_entries() {
        let yaml = r#"
version: "1.0"
patterns:
  - id: a
    name: A
    category: X
    description: d
    rationale: r
    confidence: 1.4
"#;
        assert!(matches!(
            PatternCatalog::from_yaml(yaml),
            Err(CatalogError::Invalid { .. })
        ));

        let yaml = r#"
version: "1.0"
patterns:
  - { id: a, name: A, category: X, description: d, rationale: r, confidence: 0.5 }
  - { id: a, name: B, category: X, description: d, rationale: r, confidence: 0.5 }
"#;
        let err = PatternCatalog::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate"));

        assert!(matches!(
            PatternCatalog::from_yaml("patterns: 3"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = PatternCatalog::load("/nonexistent/patterns.yaml").unwrap_err();
        assert!(matches!(err, CatalogError::Read { .. }));
    }
}
