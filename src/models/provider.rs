use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::status::{EventType, ServiceStatus, overall_status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Provider {
    #[serde(rename = "AWS")]
    Aws,
    #[serde(rename = "Azure")]
    Azure,
    #[serde(rename = "GCP")]
    Gcp,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Aws, Provider::Azure, Provider::Gcp];

    /// Lowercase key used in routes and the aggregate payload.
    pub fn key(self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Azure => "azure",
            Provider::Gcp => "gcp",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::Aws => "AWS",
            Provider::Azure => "Azure",
            Provider::Gcp => "GCP",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aws" => Ok(Provider::Aws),
            "azure" => Ok(Provider::Azure),
            "gcp" => Ok(Provider::Gcp),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedService {
    pub name: String,
    pub slug: String,
    pub region: String,
    pub status: ServiceStatus,
    pub status_raw: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    pub title: String,
    pub description: String,
    /// Upstream date string, kept verbatim.
    pub date: String,
    pub guid: String,
    pub service: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub provider: Provider,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub provider: Provider,
    pub overall_status: ServiceStatus,
    pub total_services: usize,
    pub categories: Vec<String>,
    pub services_by_category: BTreeMap<String, Vec<NormalizedService>>,
    pub services: Vec<NormalizedService>,
    pub recent_events: Vec<NormalizedEvent>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub active_incidents: Option<usize>,
}

impl ProviderStatus {
    /// Assemble a status from categorized services, deriving the flat list,
    /// the totals and the overall status.
    pub fn assemble(
        provider: Provider,
        grouped: Vec<(String, Vec<NormalizedService>)>,
        recent_events: Vec<NormalizedEvent>,
        active_incidents: Option<usize>,
    ) -> Self {
        let categories: Vec<String> = grouped.iter().map(|(c, _)| c.clone()).collect();
        let services: Vec<NormalizedService> = grouped
            .iter()
            .flat_map(|(_, svcs)| svcs.iter().cloned())
            .collect();
        let overall = overall_status(services.iter().map(|s| &s.status));

        Self {
            provider,
            overall_status: overall,
            total_services: services.len(),
            categories,
            services_by_category: grouped.into_iter().collect(),
            services,
            recent_events,
            active_incidents,
        }
    }
}

/// Latest known state for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub status: Option<ProviderStatus>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl CacheEntry {
    pub fn fresh(status: ProviderStatus, at: DateTime<Utc>) -> Self {
        Self {
            status: Some(status),
            last_updated: Some(at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str, status: ServiceStatus) -> NormalizedService {
        NormalizedService {
            name: name.to_string(),
            slug: name.to_lowercase(),
            region: "global".to_string(),
            status,
            status_raw: status.to_string(),
        }
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!("AWS".parse::<Provider>().unwrap(), Provider::Aws);
        assert_eq!("azure".parse::<Provider>().unwrap(), Provider::Azure);
        assert!("oracle".parse::<Provider>().is_err());
        assert_eq!(Provider::Gcp.key(), "gcp");
    }

    #[test]
    fn test_assemble_derives_totals() {
        let status = ProviderStatus::assemble(
            Provider::Gcp,
            vec![
                (
                    "Compute".to_string(),
                    vec![
                        service("Compute Engine", ServiceStatus::Operational),
                        service("Cloud Run", ServiceStatus::Degraded),
                    ],
                ),
                (
                    "Storage".to_string(),
                    vec![service("Cloud Storage", ServiceStatus::Informational)],
                ),
            ],
            Vec::new(),
            Some(1),
        );

        assert_eq!(status.total_services, 3);
        assert_eq!(status.services.len(), 3);
        assert_eq!(status.categories, vec!["Compute", "Storage"]);
        assert_eq!(status.services_by_category["Compute"].len(), 2);
        assert_eq!(status.overall_status, ServiceStatus::Degraded);
    }

    #[test]
    fn test_wire_format() {
        let status = ProviderStatus::assemble(
            Provider::Azure,
            vec![(
                "Compute".to_string(),
                vec![service("Batch", ServiceStatus::Operational)],
            )],
            Vec::new(),
            None,
        );
        let json = serde_json::to_value(CacheEntry::default()).unwrap();
        assert_eq!(json["status"], serde_json::Value::Null);
        assert_eq!(json["lastUpdated"], serde_json::Value::Null);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["provider"], "Azure");
        assert_eq!(json["overallStatus"], "operational");
        assert_eq!(json["totalServices"], 1);
        assert_eq!(json["services"][0]["statusRaw"], "operational");
        assert!(json.get("activeIncidents").is_none());
    }
}
