//! Azure status page scraping

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::catalog;
use crate::classify::{RegionCounts, azure_region_status, fuzzy_match};
use crate::config::Config;
use crate::errors::Result;
use crate::models::{NormalizedService, Provider, ProviderStatus, ServiceStatus};
use crate::services::feed::{FeedItem, normalize_events, parse_rss};
use crate::services::upstream::UpstreamClient;
use crate::services::{ProviderFetcher, or_empty};
use crate::text::{decode_entities, leading_subject, slugify};

/// Feed categories folded into an event's service field.
const MAX_EVENT_CATEGORIES: usize = 5;

/// One service row of the region matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct AzureServiceRow {
    pub name: String,
    pub regions: RegionCounts,
}

impl AzureServiceRow {
    fn status(&self) -> ServiceStatus {
        azure_region_status(&self.regions)
    }
}

struct PagePatterns {
    default_table: Regex,
    row: Regex,
    label: Regex,
}

fn patterns() -> &'static PagePatterns {
    static PATTERNS: OnceLock<PagePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| PagePatterns {
        default_table: Regex::new(r#"(?s)<table[^>]*class="[^"]*\bdefault\b[^"]*"[^>]*>(.*?)</table>"#)
            .expect("valid table regex"),
        row: Regex::new(r"(?s)<tr[^>]*>\s*<td[^>]*>\s*<span>([^<]+)</span>\s*</td>(.*?)</tr>")
            .expect("valid row regex"),
        label: Regex::new(r#"data-label="([^"]*)""#).expect("valid label regex"),
    })
}

/// Scrape service rows from the status page. The page embeds one table per
/// geography filter; only the default view is read, falling back to the
/// whole document when no table is marked default.
pub fn parse_status_page(html: &str) -> Vec<AzureServiceRow> {
    let p = patterns();

    let table = p
        .default_table
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(html);

    p.row
        .captures_iter(table)
        .map(|caps| {
            let mut regions = RegionCounts::default();
            for label in p.label.captures_iter(&caps[2]) {
                regions.record(&label[1]);
            }
            AzureServiceRow {
                name: decode_entities(caps[1].trim()),
                regions,
            }
        })
        .collect()
}

/// Pick the row(s) describing a catalog service. A case-insensitive exact
/// name wins; otherwise every fuzzy match is considered.
fn matching_rows<'a>(name: &str, rows: &'a [AzureServiceRow]) -> Vec<&'a AzureServiceRow> {
    let exact: Vec<&AzureServiceRow> = rows
        .iter()
        .filter(|r| r.name.eq_ignore_ascii_case(name))
        .collect();

    if !exact.is_empty() {
        return exact;
    }

    rows.iter().filter(|r| fuzzy_match(name, &r.name)).collect()
}

fn build_service(name: &str, rows: &[AzureServiceRow]) -> NormalizedService {
    let mut status = ServiceStatus::Operational;
    let mut status_raw = "Good";

    for row in matching_rows(name, rows) {
        let candidate = row.status();
        if candidate.rank() > status.rank() {
            status = candidate;
            status_raw = row.regions.raw_label();
        } else if candidate == status && status == ServiceStatus::Operational {
            // a warning confined to a few regions still reports its label
            if row.regions.warning > 0 && status_raw == "Good" {
                status_raw = row.regions.raw_label();
            }
        }
    }

    NormalizedService {
        name: name.to_string(),
        slug: slugify(name),
        region: "global".to_string(),
        status,
        status_raw: status_raw.to_string(),
    }
}

fn event_service(item: &FeedItem) -> String {
    if item.categories.is_empty() {
        return leading_subject(&item.title);
    }

    item.categories
        .iter()
        .take(MAX_EVENT_CATEGORIES)
        .map(|c| c.trim())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn build_status(rows: &[AzureServiceRow], items: Vec<FeedItem>) -> ProviderStatus {
    let grouped = catalog::overlay(Provider::Azure, |entry| build_service(entry.name, rows));

    let recent_events = normalize_events(items, Provider::Azure, event_service);

    ProviderStatus::assemble(Provider::Azure, grouped, recent_events, None)
}

pub struct AzureFetcher {
    client: UpstreamClient,
    status_url: String,
    rss_url: String,
    page_timeout: Duration,
    feed_timeout: Duration,
}

impl AzureFetcher {
    pub fn new(client: UpstreamClient, config: &Config) -> Self {
        Self {
            client,
            status_url: config.azure_status_url.clone(),
            rss_url: config.azure_rss_url.clone(),
            page_timeout: config.status_page_timeout(),
            feed_timeout: config.feed_timeout(),
        }
    }

    async fn fetch_rows(&self) -> Result<Vec<AzureServiceRow>> {
        let html = self.client.get_text(&self.status_url, self.page_timeout).await?;
        let rows = parse_status_page(&html);
        debug!("Azure status page yielded {} service rows", rows.len());
        Ok(rows)
    }

    async fn fetch_feed(&self) -> Result<Vec<FeedItem>> {
        let body = self.client.get_bytes(&self.rss_url, self.feed_timeout).await?;
        parse_rss(&body)
    }
}

#[async_trait]
impl ProviderFetcher for AzureFetcher {
    fn provider(&self) -> Provider {
        Provider::Azure
    }

    #[instrument(skip(self), fields(provider = "Azure"))]
    async fn fetch(&self) -> Result<ProviderStatus> {
        let (rows, feed) = tokio::join!(self.fetch_rows(), self.fetch_feed());
        let rows = or_empty(rows, Provider::Azure, "status page");
        let items = or_empty(feed, Provider::Azure, "RSS");

        Ok(build_status(&rows, items))
    }
}
