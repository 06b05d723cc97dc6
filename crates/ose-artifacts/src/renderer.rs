//! Template rendering.
//!
//! Uses Handlebars with HTML escaping disabled, since artifacts are source
//! code and config. Custom helpers:
//! - pascal: `inventory-manager` -> `InventoryManager`
//! - snake: `inventory-manager` -> `inventory_manager`
//! - percent: `0.85` -> `85%`
//! - join: join an array with ", "

use crate::templates::{TemplateError, TemplateSet};
use handlebars::{handlebars_helper, Handlebars};
use ose_core::{RecommendedPattern, ServiceConstraints};
use serde_json::{json, Map, Value};

handlebars_helper!(pascal: |s: str| to_pascal(s));
handlebars_helper!(snake: |s: str| s.replace('-', "_"));
handlebars_helper!(percent: |v: f64| format!("{}%", (v * 100.0).round() as i64));
handlebars_helper!(join: |values: array| values
    .iter()
    .map(|v| v.as_str().map(String::from).unwrap_or_else(|| v.to_string()))
    .collect::<Vec<_>>()
    .join(", "));

fn to_pascal(s: &str) -> String {
    s.split(|c: char| c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Path and body templates compiled once
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new(set: &TemplateSet) -> Result<Self, TemplateError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars.register_helper("pascal", Box::new(pascal));
        handlebars.register_helper("snake", Box::new(snake));
        handlebars.register_helper("percent", Box::new(percent));
        handlebars.register_helper("join", Box::new(join));

        for template in &set.templates {
            for (key, source) in [
                (path_key(&template.name), &template.path),
                (body_key(&template.name), &template.template),
            ] {
                handlebars
                    .register_template_string(&key, source)
                    .map_err(|e| TemplateError::Compile {
                        name: template.name.clone(),
                        message: e.to_string(),
                    })?;
            }
        }

        Ok(Self { handlebars })
    }

    /// Render `(path, content)` for a named template
    pub fn render(&self, name: &str, data: &Value) -> Result<(String, String), TemplateError> {
        let render = |key: String| {
            self.handlebars
                .render(&key, data)
                .map_err(|e| TemplateError::Render {
                    name: name.to_string(),
                    message: e.to_string(),
                })
        };

        let path = render(path_key(name))?;
        let content = render(body_key(name))?;
        Ok((path.trim().to_string(), content))
    }

    /// Render an inline template string against the same helpers
    pub fn render_string(&self, template: &str, data: &Value) -> Result<String, TemplateError> {
        self.handlebars
            .render_template(template, data)
            .map_err(|e| TemplateError::Render {
                name: "inline".to_string(),
                message: e.to_string(),
            })
    }
}

fn path_key(name: &str) -> String {
    format!("{}#path", name)
}

fn body_key(name: &str) -> String {
    format!("{}#body", name)
}

/// Data every template is rendered against
pub fn blueprint_context(constraints: &ServiceConstraints, patterns: &[RecommendedPattern]) -> Value {
    let mut uses = Map::new();
    for integration in &constraints.integrations {
        uses.insert(integration.as_str().to_lowercase(), Value::Bool(true));
    }

    let max_replicas = (constraints.throughput_tps.saturating_add(249) / 250).clamp(2, 50);

    json!({
        "service_name": constraints.service_name,
        "service_type": constraints.service_type.as_str(),
        "throughput_tps": constraints.throughput_tps,
        "latency_p99_ms": constraints.latency_p99_ms,
        "latency_p95_ms": constraints.latency_p99_ms.saturating_mul(4) / 5,
        "consistency_model": constraints.consistency_model.as_str(),
        "deployment_target": constraints.deployment_target.as_str(),
        "team_size": constraints.team_size,
        "integrations": constraints.integrations.iter().map(|i| i.as_str()).collect::<Vec<_>>(),
        "uses": uses,
        "patterns": patterns,
        "min_replicas": 2,
        "max_replicas": max_replicas,
    })
}
