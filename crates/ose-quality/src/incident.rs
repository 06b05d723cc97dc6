//! Production incidents feeding the impact dimension

use serde::{Deserialize, Serialize};
use std::fmt;

/// Incident severity, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(rename = "SEV1", alias = "sev1")]
    Sev1,
    #[serde(rename = "SEV2", alias = "sev2")]
    Sev2,
    #[serde(rename = "SEV3", alias = "sev3")]
    Sev3,
    /// Any tag we do not recognise
    #[serde(other)]
    Unknown,
}

impl Severity {
    /// Penalty subtracted from the stability factor
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Sev1 => 0.5,
            Severity::Sev2 => 0.2,
            Severity::Sev3 => 0.1,
            Severity::Unknown => 0.05,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tag = match self {
            Severity::Sev1 => "SEV1",
            Severity::Sev2 => "SEV2",
            Severity::Sev3 => "SEV3",
            Severity::Unknown => "UNKNOWN",
        };
        write!(f, "{}", tag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub severity: Severity,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration_minutes: u32,
}

impl Incident {
    pub fn new(severity: Severity, description: impl Into<String>) -> Self {
        Self {
            severity,
            description: description.into(),
            duration_minutes: 0,
        }
    }
}

/// `max(0, 1 - sum of severity weights)`
pub fn stability_factor(incidents: &[Incident]) -> f64 {
    let penalty: f64 = incidents.iter().map(|i| i.severity.weight()).sum();
    (1.0 - penalty).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Sev1 < Severity::Sev2);
        assert!(Severity::Sev2 < Severity::Sev3);
        assert!(Severity::Sev1.weight() > Severity::Sev3.weight());
    }

    #[test]
    fn test_unknown_tag_deserializes() {
        let incident: Incident =
            serde_json::from_str(r#"{"severity": "SEV9", "description": "pager storm"}"#).unwrap();
        assert_eq!(incident.severity, Severity::Unknown);
        assert_eq!(incident.severity.weight(), 0.05);

        let incident: Incident = serde_json::from_str(r#"{"severity": "SEV2"}"#).unwrap();
        assert_eq!(incident.severity, Severity::Sev2);
    }

    #[test]
    fn test_stability_factor_floor() {
        assert_eq!(stability_factor(&[]), 1.0);

        let many = vec![Incident::new(Severity::Sev1, "outage"); 3];
        assert_eq!(stability_factor(&many), 0.0);
    }
}
