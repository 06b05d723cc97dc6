//! Gateway configuration
//!
//! Layered in order: built-in defaults, an optional YAML file, then `OSE_*`
//! environment variables. Command-line flags are applied last by the binary.

use ose_orchestrator::OrchestratorTimeouts;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const LOG_LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid value for {key}: {value:?}")]
    Env { key: String, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_true")]
    pub enable_metrics: bool,

    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Total deadline for one GenerateBlueprint call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Per-call budget for a pattern or artifact source
    #[serde(default = "default_collaborator_timeout_ms")]
    pub collaborator_timeout_ms: u64,

    /// Pattern catalog override. The embedded catalog is used when unset.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Artifact template override. The embedded set is used when unset.
    #[serde(default)]
    pub template_path: Option<PathBuf>,

    /// Interval of the background synergy pass, 0 disables it
    #[serde(default = "default_synergy_interval_secs")]
    pub synergy_interval_secs: u64,

    /// Observations retained for synergy analysis, oldest evicted first
    #[serde(default = "default_max_observations")]
    pub max_observations: usize,

    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent_requests() -> usize {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_collaborator_timeout_ms() -> u64 {
    5_000
}

fn default_synergy_interval_secs() -> u64 {
    300
}

fn default_max_observations() -> usize {
    ose_confidence::DEFAULT_OBSERVATION_CAPACITY
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            log_level: default_log_level(),
            log_json: false,
            enable_metrics: true,
            max_concurrent_requests: default_max_concurrent_requests(),
            request_timeout_secs: default_request_timeout_secs(),
            collaborator_timeout_ms: default_collaborator_timeout_ms(),
            catalog_path: None,
            template_path: None,
            synergy_interval_secs: default_synergy_interval_secs(),
            max_observations: default_max_observations(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl AdvisoryConfig {
    /// Defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `OSE_*` overrides read through `lookup`
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("OSE_LISTEN_ADDR") {
            self.listen_addr = v;
        }
        if let Some(v) = lookup("OSE_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = lookup("OSE_LOG_JSON") {
            self.log_json = parse_bool("OSE_LOG_JSON", &v)?;
        }
        if let Some(v) = lookup("OSE_ENABLE_METRICS") {
            self.enable_metrics = parse_bool("OSE_ENABLE_METRICS", &v)?;
        }
        if let Some(v) = lookup("OSE_MAX_CONCURRENT") {
            self.max_concurrent_requests = parse_number("OSE_MAX_CONCURRENT", &v)?;
        }
        if let Some(v) = lookup("OSE_REQUEST_TIMEOUT") {
            self.request_timeout_secs = parse_number("OSE_REQUEST_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("OSE_COLLABORATOR_TIMEOUT_MS") {
            self.collaborator_timeout_ms = parse_number("OSE_COLLABORATOR_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("OSE_CATALOG_PATH") {
            self.catalog_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("OSE_TEMPLATE_PATH") {
            self.template_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("OSE_SYNERGY_INTERVAL") {
            self.synergy_interval_secs = parse_number("OSE_SYNERGY_INTERVAL", &v)?;
        }
        if let Some(v) = lookup("OSE_MAX_OBSERVATIONS") {
            self.max_observations = parse_number("OSE_MAX_OBSERVATIONS", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen_addr.trim().is_empty() {
            return Err(ConfigError::Invalid("listen_addr must not be empty".into()));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "log_level must be one of {}, got {:?}",
                LOG_LEVELS.join("/"),
                self.log_level
            )));
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_requests must be greater than zero".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.collaborator_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "collaborator_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.max_observations == 0 {
            return Err(ConfigError::Invalid(
                "max_observations must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn timeouts(&self) -> OrchestratorTimeouts {
        OrchestratorTimeouts {
            call_timeout: Duration::from_millis(self.collaborator_timeout_ms),
            total_deadline: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn synergy_interval(&self) -> Option<Duration> {
        (self.synergy_interval_secs > 0).then(|| Duration::from_secs(self.synergy_interval_secs))
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Env {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AdvisoryConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert!(config.enable_metrics);
        assert!(config.validate().is_ok());

        let timeouts = config.timeouts();
        assert_eq!(timeouts.call_timeout, Duration::from_secs(5));
        assert_eq!(timeouts.total_deadline, Duration::from_secs(30));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AdvisoryConfig::from_yaml(
            "listen_addr: 127.0.0.1:9090\ncollaborator_timeout_ms: 750\n",
        )
        .unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9090");
        assert_eq!(config.collaborator_timeout_ms, 750);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.synergy_interval(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("OSE_LISTEN_ADDR", "127.0.0.1:7000"),
            ("OSE_LOG_JSON", "yes"),
            ("OSE_ENABLE_METRICS", "0"),
            ("OSE_SYNERGY_INTERVAL", "0"),
        ]
        .into_iter()
        .collect();

        let mut config = AdvisoryConfig::from_yaml("listen_addr: 0.0.0.0:1\n").unwrap();
        config
            .apply_env_with(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:7000");
        assert!(config.log_json);
        assert!(!config.enable_metrics);
        assert_eq!(config.synergy_interval(), None);
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let mut config = AdvisoryConfig::default();
        let err = config
            .apply_env_with(|key| (key == "OSE_MAX_CONCURRENT").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { ref key, .. } if key == "OSE_MAX_CONCURRENT"));
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let config = AdvisoryConfig {
            log_level: "chatty".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_trace_level_is_rejected() {
        for level in ["trace", "TRACE"] {
            let config = AdvisoryConfig {
                log_level: level.into(),
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }

        for level in ["debug", "info", "WARN", "error"] {
            let config = AdvisoryConfig {
                log_level: level.into(),
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        let config = AdvisoryConfig {
            max_concurrent_requests: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = AdvisoryConfig {
            max_observations: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_observation_capacity_from_env() {
        let mut config = AdvisoryConfig::default();
        assert_eq!(config.max_observations, 10_000);

        config
            .apply_env_with(|key| (key == "OSE_MAX_OBSERVATIONS").then(|| "250".to_string()))
            .unwrap();
        assert_eq!(config.max_observations, 250);
    }
}
