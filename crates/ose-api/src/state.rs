//! Shared handler state
use crate::config::AdvisoryConfig;
use crate::metrics::AdvisoryMetrics;
use anyhow::Context;
use ose_artifacts::TemplateArtifactSource;
use ose_catalog::{CatalogPatternSource, PatternCatalog};
use ose_confidence::{ConfidenceStore, ObservationLog};
use ose_core::{ArtifactSource, PatternSource};
use ose_orchestrator::{BlueprintOrchestrator, OrchestratorTimeouts};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<BlueprintOrchestrator>,
    pub patterns: Arc<dyn PatternSource>,
    pub confidence: Arc<ConfidenceStore>,
    pub observations: Arc<ObservationLog>,
    pub metrics: Option<Arc<AdvisoryMetrics>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        patterns: Arc<dyn PatternSource>,
        artifacts: Arc<dyn ArtifactSource>,
        confidence: Arc<ConfidenceStore>,
        timeouts: OrchestratorTimeouts,
    ) -> Self {
        let orchestrator =
            BlueprintOrchestrator::new(Arc::clone(&patterns), artifacts).with_timeouts(timeouts);

        Self {
            orchestrator: Arc::new(orchestrator),
            patterns,
            confidence,
            observations: Arc::new(ObservationLog::new()),
            metrics: None,
            started_at: Instant::now(),
        }
    }

    pub fn with_observations(mut self, observations: Arc<ObservationLog>) -> Self {
        self.observations = observations;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<AdvisoryMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Wire the catalog and template collaborators named by `config`
    pub fn from_config(config: &AdvisoryConfig) -> anyhow::Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => PatternCatalog::load(path)
                .with_context(|| format!("loading pattern catalog {}", path.display()))?,
            None => PatternCatalog::embedded().context("loading embedded pattern catalog")?,
        };

        let artifacts = match &config.template_path {
            Some(path) => TemplateArtifactSource::load(path)
                .with_context(|| format!("loading artifact templates {}", path.display()))?,
            None => TemplateArtifactSource::embedded().context("loading embedded templates")?,
        };

        let confidence = Arc::new(ConfidenceStore::new());
        let pattern_count = catalog.len();
        let patterns = CatalogPatternSource::new(catalog, Arc::clone(&confidence))
            .context("seeding pattern confidence")?;

        info!(
            patterns = pattern_count,
            catalog = config
                .catalog_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "embedded".to_string()),
            "pattern catalog loaded"
        );

        let mut state = Self::new(
            Arc::new(patterns),
            Arc::new(artifacts),
            confidence,
            config.timeouts(),
        )
        .with_observations(Arc::new(ObservationLog::with_capacity(
            config.max_observations,
        )));

        if config.enable_metrics {
            let metrics = AdvisoryMetrics::new().context("registering metrics")?;
            state = state.with_metrics(Arc::new(metrics));
        }

        Ok(state)
    }

    pub fn call_timeout(&self) -> std::time::Duration {
        self.orchestrator.timeouts().call_timeout
    }
}
