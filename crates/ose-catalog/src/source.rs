//! Catalog-backed PatternSource
//!
//! Recommendations are ranked by live confidence, so outcomes registered
//! through the feedback loop change what the next blueprint recommends.

use crate::catalog::{CatalogEntry, CatalogError, PatternCatalog};
use async_trait::async_trait;
use ose_confidence::ConfidenceStore;
use ose_core::{PatternSource, PatternSummary, RecommendedPattern, ServiceConstraints, SourceError};
use std::sync::Arc;
use tracing::debug;

pub struct CatalogPatternSource {
    catalog: PatternCatalog,
    store: Arc<ConfidenceStore>,
}

impl CatalogPatternSource {
    /// Seeds the store with each entry's prior; existing records win
    pub fn new(catalog: PatternCatalog, store: Arc<ConfidenceStore>) -> Result<Self, CatalogError> {
        for entry in catalog.entries() {
            store
                .seed(&entry.id, entry.confidence)
                .map_err(|e| CatalogError::Invalid {
                    id: entry.id.clone(),
                    reason: e.to_string(),
                })?;
        }
        Ok(Self { catalog, store })
    }

    /// Applicable, non-excluded patterns, highest confidence first
    pub fn recommend(&self, constraints: &ServiceConstraints) -> Vec<RecommendedPattern> {
        let mut patterns: Vec<RecommendedPattern> = self
            .catalog
            .entries()
            .iter()
            .filter(|e| !constraints.is_excluded(&e.id) && e.applies_to(constraints))
            .map(|e| self.recommended(e))
            .collect();

        patterns.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.pattern_id.cmp(&b.pattern_id))
        });

        debug!(
            service_name = %constraints.service_name,
            matched = patterns.len(),
            "catalog query"
        );
        patterns
    }

    /// Keyword search over id, name, category, description and tags
    pub fn keyword_search(&self, text: &str, top_k: usize) -> Vec<PatternSummary> {
        let terms: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric() && c != '-')
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();

        if terms.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(usize, PatternSummary)> = self
            .catalog
            .entries()
            .iter()
            .filter_map(|e| {
                let haystack = e.search_text();
                let score = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
                (score > 0).then(|| (score, self.summary(e)))
            })
            .collect();

        hits.sort_by(|(sa, a), (sb, b)| {
            sb.cmp(sa)
                .then_with(|| b.usage_count.cmp(&a.usage_count))
                .then_with(|| a.pattern_id.cmp(&b.pattern_id))
        });

        hits.into_iter().take(top_k).map(|(_, s)| s).collect()
    }

    fn usage(&self, entry: &CatalogEntry) -> u64 {
        let feedback = self.store.get(&entry.id).map(|r| r.update_count).unwrap_or(0);
        entry.usage_count + feedback
    }

    fn recommended(&self, entry: &CatalogEntry) -> RecommendedPattern {
        RecommendedPattern {
            pattern_id: entry.id.clone(),
            name: entry.name.clone(),
            category: entry.category.clone(),
            confidence: self.store.confidence(&entry.id).unwrap_or(entry.confidence),
            rationale: entry.rationale.clone(),
            application_count: self.usage(entry),
        }
    }

    fn summary(&self, entry: &CatalogEntry) -> PatternSummary {
        PatternSummary {
            pattern_id: entry.id.clone(),
            name: entry.name.clone(),
            category: entry.category.clone(),
            description: entry.description.clone(),
            usage_count: self.usage(entry),
        }
    }
}

#[async_trait]
impl PatternSource for CatalogPatternSource {
    fn id(&self) -> &'static str {
        "pattern-catalog"
    }

    async fn query(
        &self,
        constraints: &ServiceConstraints,
    ) -> Result<Vec<RecommendedPattern>, SourceError> {
        Ok(self.recommend(constraints))
    }

    async fn search(&self, text: &str, top_k: usize) -> Result<Vec<PatternSummary>, SourceError> {
        Ok(self.keyword_search(text, top_k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ose_core::{ConsistencyModel, DeploymentTarget, IntegrationType, ServiceType};

    fn source() -> (CatalogPatternSource, Arc<ConfidenceStore>) {
        let store = Arc::new(ConfidenceStore::new());
        let source =
            CatalogPatternSource::new(PatternCatalog::embedded().unwrap(), store.clone()).unwrap();
        (source, store)
    }

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

    #[test]
    fn test_recommendations_for_inventory_manager() {
        let (source, _) = source();
        let ids: Vec<String> = source
            .recommend(&inventory_manager())
            .into_iter()
            .map(|p| p.pattern_id)
            .collect();

        for expected in [
            "rest-api-v1",
            "circuit-breaker-v1",
            "transactional-outbox-v1",
            "idempotent-consumer-v1",
            "connection-pooling-v1",
            "cache-aside-v1",
            "health-probes-v1",
        ] {
            assert!(ids.iter().any(|id| id == expected), "missing {}", expected);
        }
        assert!(!ids.iter().any(|id| id == "cold-start-mitigation-v1"));
        assert!(!ids.iter().any(|id| id == "horizontal-autoscaling-v1"));
        assert_eq!(ids[0], "health-probes-v1");
    }

    #[test]
    fn test_event_processor_gets_event_patterns() {
        let (source, _) = source();
        let c = inventory_manager()
            .with_type(ServiceType::EventProcessor)
            .with_integrations(vec![]);
        let ids: Vec<String> = source.recommend(&c).into_iter().map(|p| p.pattern_id).collect();
        assert!(ids.contains(&"event-sourcing-v1".to_string()));
        assert!(ids.contains(&"cqrs-v1".to_string()));
        assert!(!ids.contains(&"rest-api-v1".to_string()));
    }

    #[test]
    fn test_exclusions_honoured() {
        let (source, _) = source();
        let c = inventory_manager().excluding("rest-api-v1");
        assert!(source.recommend(&c).iter().all(|p| p.pattern_id != "rest-api-v1"));
    }

    #[test]
    fn test_feedback_changes_ranking_and_usage() {
        let (source, store) = source();
        let before = source.recommend(&inventory_manager());
        let top = before[0].pattern_id.clone();
        let usage = before[0].application_count;

        for _ in 0..30 {
            store.apply(&top, 0.0).unwrap();
        }

        let after = source.recommend(&inventory_manager());
        assert_ne!(after[0].pattern_id, top);
        let demoted = after.iter().find(|p| p.pattern_id == top).unwrap();
        assert_eq!(demoted.application_count, usage + 30);
        assert!(demoted.confidence < 0.1);
    }

    #[test]
    fn test_keyword_search() {
        let (source, _) = source();

        let results = source.keyword_search("kafka messaging", 10);
        assert!(!results.is_empty());
        assert!(results.iter().any(|s| s.pattern_id == "idempotent-consumer-v1"));

        let limited = source.keyword_search("resilience retry latency", 2);
        assert_eq!(limited.len(), 2);

        assert!(source.keyword_search("   ", 10).is_empty());
        assert!(source.keyword_search("mainframe", 10).is_empty());
    }

    #[tokio::test]
    async fn test_pattern_source_contract() {
        let (source, _) = source();
        let patterns = source.query(&inventory_manager()).await.unwrap();
        assert!(patterns.iter().all(|p| (0.0..=1.0).contains(&p.confidence)));

        let found = source.search("circuit breaker", 5).await.unwrap();
        assert_eq!(found[0].pattern_id, "circuit-breaker-v1");
    }
}
