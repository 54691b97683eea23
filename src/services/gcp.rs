//! Google Cloud status ingestion

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::catalog;
use crate::classify::{fuzzy_match, gcp_severity_status};
use crate::config::Config;
use crate::errors::Result;
use crate::models::{NormalizedService, Provider, ProviderStatus, ServiceStatus};
use crate::services::feed::{FeedItem, normalize_events, parse_atom};
use crate::services::upstream::UpstreamClient;
use crate::services::{ProviderFetcher, or_empty};
use crate::text::{leading_subject, slugify};

/// Assumed severity for an incident that carries none.
const DEFAULT_SEVERITY: &str = "SERVICE_DISRUPTION";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct IncidentUpdate {
    pub severity: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AffectedProduct {
    Titled { title: String },
    Name(String),
}

impl AffectedProduct {
    pub fn name(&self) -> &str {
        match self {
            AffectedProduct::Titled { title } => title,
            AffectedProduct::Name(name) => name,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GcpIncident {
    pub id: Option<String>,
    pub end: Option<Value>,
    pub severity: Option<String>,
    pub most_recent_update: Option<IncidentUpdate>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub affected_products: Vec<AffectedProduct>,
}

impl GcpIncident {
    /// An incident is active until it carries an end timestamp.
    pub fn is_active(&self) -> bool {
        match &self.end {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        }
    }

    fn status(&self) -> ServiceStatus {
        let severity = non_blank(self.severity.as_deref())
            .or_else(|| {
                self.most_recent_update
                    .as_ref()
                    .and_then(|u| non_blank(u.severity.as_deref()))
            })
            .unwrap_or(DEFAULT_SEVERITY);
        gcp_severity_status(Some(severity))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<AffectedProduct>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<AffectedProduct>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse the incident list. A record that does not fit the incident shape is
/// skipped on its own; only a body that is not a JSON array fails.
pub fn parse_incidents(body: &[u8]) -> Result<Vec<GcpIncident>> {
    let records: Vec<Value> = serde_json::from_slice(body)?;

    let incidents = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<GcpIncident>(record) {
            Ok(incident) => Some(incident),
            Err(e) => {
                warn!("Skipping malformed GCP incident at index {}: {}", index, e);
                None
            }
        })
        .collect();

    Ok(incidents)
}

/// Worst status per affected product across active incidents.
pub fn product_statuses(incidents: &[GcpIncident]) -> BTreeMap<String, ServiceStatus> {
    let mut products: BTreeMap<String, ServiceStatus> = BTreeMap::new();

    for incident in incidents.iter().filter(|i| i.is_active()) {
        let status = incident.status();
        for product in &incident.affected_products {
            let entry = products
                .entry(product.name().to_string())
                .or_insert(status);
            *entry = entry.worst(status);
        }
    }

    products
}

fn build_service(name: &str, products: &BTreeMap<String, ServiceStatus>) -> NormalizedService {
    let status = products
        .iter()
        .filter(|(product, _)| fuzzy_match(name, product))
        .fold(ServiceStatus::Operational, |acc, (_, s)| acc.worst(*s));

    NormalizedService {
        name: name.to_string(),
        slug: slugify(name),
        region: "global".to_string(),
        status,
        status_raw: status.to_string(),
    }
}

pub fn build_status(incidents: &[GcpIncident], items: Vec<FeedItem>) -> ProviderStatus {
    let products = product_statuses(incidents);
    let active = incidents.iter().filter(|i| i.is_active()).count();

    let grouped = catalog::overlay(Provider::Gcp, |entry| build_service(entry.name, &products));

    let recent_events = normalize_events(items, Provider::Gcp, |item| leading_subject(&item.title));

    ProviderStatus::assemble(Provider::Gcp, grouped, recent_events, Some(active))
}

pub struct GcpFetcher {
    client: UpstreamClient,
    incidents_url: String,
    feed_url: String,
    incidents_timeout: Duration,
    feed_timeout: Duration,
}

impl GcpFetcher {
    pub fn new(client: UpstreamClient, config: &Config) -> Self {
        Self {
            client,
            incidents_url: config.gcp_incidents_url.clone(),
            feed_url: config.gcp_feed_url.clone(),
            incidents_timeout: config.events_timeout(),
            feed_timeout: config.feed_timeout(),
        }
    }

    async fn fetch_incidents(&self) -> Result<Vec<GcpIncident>> {
        let body = self
            .client
            .get_bytes(&self.incidents_url, self.incidents_timeout)
            .await?;
        let incidents = parse_incidents(&body)?;
        debug!("GCP returned {} incidents", incidents.len());
        Ok(incidents)
    }

    async fn fetch_feed(&self) -> Result<Vec<FeedItem>> {
        let xml = self.client.get_text(&self.feed_url, self.feed_timeout).await?;
        parse_atom(&xml)
    }
}

#[async_trait]
impl ProviderFetcher for GcpFetcher {
    fn provider(&self) -> Provider {
        Provider::Gcp
    }

    #[instrument(skip(self), fields(provider = "GCP"))]
    async fn fetch(&self) -> Result<ProviderStatus> {
        let (incidents, feed) = tokio::join!(self.fetch_incidents(), self.fetch_feed());
        let incidents = or_empty(incidents, Provider::Gcp, "incidents");
        let items = or_empty(feed, Provider::Gcp, "Atom feed");

        Ok(build_status(&incidents, items))
    }
}
