//! Artifact template definitions.
//!
//! Templates live in a YAML file of the form:
//!
//! ```yaml
//! version: "1.0"
//! templates:
//!   - name: service-proto
//!     artifact_type: PROTO
//!     language: protobuf
//!     path: "api/{{service_name}}/v1/{{service_name}}.proto"
//!     deployment_targets: []
//!     template: |
//!       syntax = "proto3";
//! ```

use ose_core::{ArtifactType, DeploymentTarget};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

static EMBEDDED_TEMPLATES: &str = include_str!("../templates/artifacts.yaml");

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("failed to read templates {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse templates YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("template {name} does not compile: {message}")]
    Compile { name: String, message: String },

    #[error("template {name} failed to render: {message}")]
    Render { name: String, message: String },

    #[error("invalid template set: {0}")]
    Invalid(String),
}

/// A single artifact template
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactTemplate {
    pub name: String,
    pub artifact_type: ArtifactType,
    pub language: String,
    /// Handlebars template for the output path
    pub path: String,
    pub template: String,
    /// Empty means every target
    #[serde(default)]
    pub deployment_targets: Vec<DeploymentTarget>,
}

impl ArtifactTemplate {
    pub fn targets(&self, target: DeploymentTarget) -> bool {
        self.deployment_targets.is_empty() || self.deployment_targets.contains(&target)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSet {
    pub version: String,
    pub templates: Vec<ArtifactTemplate>,
}

impl TemplateSet {
    pub fn embedded() -> Result<Self, TemplateError> {
        Self::from_yaml(EMBEDDED_TEMPLATES)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, TemplateError> {
        let set: TemplateSet = serde_yaml::from_str(yaml)?;

        let mut names = HashSet::new();
        for template in &set.templates {
            if !names.insert(template.name.as_str()) {
                return Err(TemplateError::Invalid(format!(
                    "duplicate template name {}",
                    template.name
                )));
            }
        }

        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<&ArtifactTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name.as_str()).collect()
    }
}
