//! AWS Health Dashboard ingestion

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::catalog;
use crate::classify::{aws_event_status, fuzzy_match};
use crate::config::Config;
use crate::errors::{Result, StatusError};
use crate::models::{NormalizedService, Provider, ProviderStatus, ServiceStatus};
use crate::services::feed::{FeedItem, normalize_events, parse_rss};
use crate::services::upstream::UpstreamClient;
use crate::services::{ProviderFetcher, or_empty};
use crate::text::slugify;

const DEFAULT_REGION: &str = "global";

/// One record from the current-events document.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AwsEvent {
    pub service_name: Option<String>,
    pub service: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    /// Numeric or textual depending on the feed revision.
    pub status: Option<Value>,
    pub region: Option<String>,
    pub region_name: Option<String>,
}

impl AwsEvent {
    fn names(&self) -> impl Iterator<Item = &str> {
        self.service_name
            .as_deref()
            .into_iter()
            .chain(self.service.as_deref())
    }

    fn region(&self) -> Option<String> {
        [self.region.as_deref(), self.region_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|r| !r.is_empty())
            .map(str::to_string)
    }

    fn matches(&self, catalog_name: &str) -> bool {
        self.names().any(|n| fuzzy_match(catalog_name, n))
    }

    fn classify(&self) -> ServiceStatus {
        let description = self
            .description
            .as_deref()
            .or(self.summary.as_deref())
            .unwrap_or_default();
        let status = match &self.status {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        aws_event_status(description, &status)
    }
}

/// Decode the events body. AWS serves it as UTF-16 with a byte-order mark;
/// without a BOM the body is treated as UTF-8.
pub fn decode_events_body(bytes: &[u8]) -> Result<String> {
    let text = match bytes {
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes)?,
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes)?,
        [0xEF, 0xBB, 0xBF, rest @ ..] => utf8(rest)?,
        _ => utf8(bytes)?,
    };

    Ok(text.trim_start_matches('\u{FEFF}').to_string())
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(StatusError::Decode(format!(
            "UTF-16 body has odd length {}",
            bytes.len()
        )));
    }

    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| StatusError::Decode(format!("invalid UTF-16: {}", e)))
}

fn utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| StatusError::Decode(format!("invalid UTF-8: {}", e)))
}

pub fn parse_events(bytes: &[u8]) -> Result<Vec<AwsEvent>> {
    let text = decode_events_body(bytes)?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(serde_json::from_str(&text)?)
}

/// Heuristic service name from an RSS title such as
/// "Informational message: Amazon S3 (us-east-1)".
pub fn service_from_title(title: &str) -> String {
    static AFTER_COLON: OnceLock<Regex> = OnceLock::new();
    let re = AFTER_COLON
        .get_or_init(|| Regex::new(r":\s*(.+?)(?:\s*\(|$)").expect("valid title regex"));

    if let Some(caps) = re.captures(title) {
        return caps[1].trim().to_string();
    }

    title.split(':').next().unwrap_or(title).trim().to_string()
}

fn build_service(name: &str, events: &[AwsEvent]) -> NormalizedService {
    let mut worst: Option<(ServiceStatus, Option<String>)> = None;

    for event in events.iter().filter(|e| e.matches(name)) {
        let candidate = event.classify();
        let replace = match &worst {
            Some((status, _)) => candidate.rank() > status.rank(),
            None => true,
        };
        if replace {
            worst = Some((candidate, event.region()));
        }
    }

    let (status, region) = worst.unwrap_or((ServiceStatus::Operational, None));

    NormalizedService {
        name: name.to_string(),
        slug: slugify(name),
        region: region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
        status,
        status_raw: status.to_string(),
    }
}

/// Overlay active events onto the catalog and attach the feed.
pub fn build_status(events: &[AwsEvent], items: Vec<FeedItem>) -> ProviderStatus {
    let grouped = catalog::overlay(Provider::Aws, |entry| build_service(entry.name, events));

    let recent_events = normalize_events(items, Provider::Aws, |item| service_from_title(&item.title));

    ProviderStatus::assemble(Provider::Aws, grouped, recent_events, Some(events.len()))
}

pub struct AwsFetcher {
    client: UpstreamClient,
    events_url: String,
    rss_url: String,
    events_timeout: Duration,
    feed_timeout: Duration,
}

impl AwsFetcher {
    pub fn new(client: UpstreamClient, config: &Config) -> Self {
        Self {
            client,
            events_url: config.aws_events_url.clone(),
            rss_url: config.aws_rss_url.clone(),
            events_timeout: config.events_timeout(),
            feed_timeout: config.feed_timeout(),
        }
    }

    async fn fetch_events(&self) -> Result<Vec<AwsEvent>> {
        let body = self.client.get_bytes(&self.events_url, self.events_timeout).await?;
        let events = parse_events(&body)?;
        debug!("AWS reported {} active events", events.len());
        Ok(events)
    }

    async fn fetch_feed(&self) -> Result<Vec<FeedItem>> {
        let body = self.client.get_bytes(&self.rss_url, self.feed_timeout).await?;
        parse_rss(&body)
    }
}

#[async_trait]
impl ProviderFetcher for AwsFetcher {
    fn provider(&self) -> Provider {
        Provider::Aws
    }

    #[instrument(skip(self), fields(provider = "AWS"))]
    async fn fetch(&self) -> Result<ProviderStatus> {
        let (events, feed) = tokio::join!(self.fetch_events(), self.fetch_feed());
        let events = or_empty(events, Provider::Aws, "events");
        let items = or_empty(feed, Provider::Aws, "RSS");

        Ok(build_status(&events, items))
    }
}
