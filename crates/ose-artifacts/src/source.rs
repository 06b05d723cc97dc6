//! Template-backed ArtifactSource
use crate::renderer::{blueprint_context, TemplateRenderer};
use crate::templates::{TemplateError, TemplateSet};
use async_trait::async_trait;
use ose_core::{Artifact, ArtifactSource, RecommendedPattern, ServiceConstraints, SourceError};
use std::path::Path;
use tracing::debug;

const SOURCE_ID: &str = "artifact-templates";

pub struct TemplateArtifactSource {
    set: TemplateSet,
    renderer: TemplateRenderer,
}

impl TemplateArtifactSource {
    pub fn new(set: TemplateSet) -> Result<Self, TemplateError> {
        let renderer = TemplateRenderer::new(&set)?;
        Ok(Self { set, renderer })
    }

    pub fn embedded() -> Result<Self, TemplateError> {
        Self::new(TemplateSet::embedded()?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        Self::new(TemplateSet::load(path)?)
    }

    /// Render every template that applies to the constraints' deployment target
    pub fn render_all(
        &self,
        constraints: &ServiceConstraints,
        patterns: &[RecommendedPattern],
    ) -> Result<Vec<Artifact>, TemplateError> {
        let data = blueprint_context(constraints, patterns);

        let artifacts = self
            .set
            .templates
            .iter()
            .filter(|t| t.targets(constraints.deployment_target))
            .map(|t| {
                let (path, content) = self.renderer.render(&t.name, &data)?;
                Ok(Artifact {
                    artifact_type: t.artifact_type,
                    path,
                    content,
                    language: t.language.clone(),
                })
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;

        debug!(
            service_name = %constraints.service_name,
            artifacts = artifacts.len(),
            "artifacts rendered"
        );
        Ok(artifacts)
    }
}

#[async_trait]
impl ArtifactSource for TemplateArtifactSource {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn generate(
        &self,
        constraints: &ServiceConstraints,
        patterns: &[RecommendedPattern],
    ) -> Result<Vec<Artifact>, SourceError> {
        self.render_all(constraints, patterns)
            .map_err(|e| SourceError::new(SOURCE_ID, e.to_string()))
    }
}
