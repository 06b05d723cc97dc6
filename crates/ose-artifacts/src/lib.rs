//! OSE Artifacts: reference artifact source
//!
//! Renders proto, code, config and doc artifacts for a blueprint from a YAML
//! set of Handlebars templates. Config templates are picked per deployment
//! target.
//!
//! # Example
//!
//! ```
//! use ose_artifacts::TemplateArtifactSource;
//! use ose_core::{DeploymentTarget, ServiceConstraints};
//!
//! let source = TemplateArtifactSource::embedded().unwrap();
//! let constraints = ServiceConstraints::new("orders-api")
//!     .with_latency(100)
//!     .deployed_on(DeploymentTarget::Kubernetes);
//!
//! let artifacts = source.render_all(&constraints, &[]).unwrap();
//! assert!(artifacts.iter().any(|a| a.path == "deployments/k8s/orders-api.yaml"));
//! ```

pub mod renderer;
pub mod source;
pub mod templates;

pub use renderer::{blueprint_context, TemplateRenderer};
pub use source::TemplateArtifactSource;
pub use templates::{ArtifactTemplate, TemplateError, TemplateSet};
