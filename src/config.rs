//! Configuration management for the status API

use clap::Parser;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "CloudStatusMonitor/1.0";

pub const AWS_EVENTS_URL: &str = "https://health.aws.amazon.com/public/currentevents";
pub const AWS_RSS_URL: &str = "https://status.aws.amazon.com/rss/all.rss";
pub const AZURE_STATUS_URL: &str = "https://azure.status.microsoft/en-us/status";
pub const AZURE_RSS_URL: &str = "https://rssfeed.azure.status.microsoft/en-us/status/feed/";
pub const GCP_INCIDENTS_URL: &str = "https://status.cloud.google.com/incidents.json";
pub const GCP_FEED_URL: &str = "https://status.cloud.google.com/en/feed.atom";

#[derive(Debug, Clone, Parser)]
#[command(name = "cloud-status-api", version, about = "Unified cloud provider status API")]
pub struct Config {
    /// Address the HTTP server binds to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port the HTTP server listens on
    #[arg(long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    /// Seconds between scheduled refresh cycles
    #[arg(long, env = "REFRESH_INTERVAL_SECONDS", default_value_t = 300)]
    pub refresh_interval_secs: u64,

    /// User-Agent header sent upstream
    #[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Timeout for JSON events/incidents documents
    #[arg(long, env = "EVENTS_TIMEOUT_SECONDS", default_value_t = 15)]
    pub events_timeout_secs: u64,

    /// Timeout for the scraped Azure status page
    #[arg(long, env = "STATUS_PAGE_TIMEOUT_SECONDS", default_value_t = 20)]
    pub status_page_timeout_secs: u64,

    /// Timeout for RSS/Atom feeds
    #[arg(long, env = "FEED_TIMEOUT_SECONDS", default_value_t = 10)]
    pub feed_timeout_secs: u64,

    #[arg(long, env = "AWS_EVENTS_URL", default_value = AWS_EVENTS_URL)]
    pub aws_events_url: String,

    #[arg(long, env = "AWS_RSS_URL", default_value = AWS_RSS_URL)]
    pub aws_rss_url: String,

    #[arg(long, env = "AZURE_STATUS_URL", default_value = AZURE_STATUS_URL)]
    pub azure_status_url: String,

    #[arg(long, env = "AZURE_RSS_URL", default_value = AZURE_RSS_URL)]
    pub azure_rss_url: String,

    #[arg(long, env = "GCP_INCIDENTS_URL", default_value = GCP_INCIDENTS_URL)]
    pub gcp_incidents_url: String,

    #[arg(long, env = "GCP_FEED_URL", default_value = GCP_FEED_URL)]
    pub gcp_feed_url: String,

    /// Single browser origin allowed to call the API; any origin when unset
    #[arg(long, env = "CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            refresh_interval_secs: 300,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            events_timeout_secs: 15,
            status_page_timeout_secs: 20,
            feed_timeout_secs: 10,
            aws_events_url: AWS_EVENTS_URL.to_string(),
            aws_rss_url: AWS_RSS_URL.to_string(),
            azure_status_url: AZURE_STATUS_URL.to_string(),
            azure_rss_url: AZURE_RSS_URL.to_string(),
            gcp_incidents_url: GCP_INCIDENTS_URL.to_string(),
            gcp_feed_url: GCP_FEED_URL.to_string(),
            cors_origin: None,
            log_json: false,
        }
    }
}

impl Config {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn events_timeout(&self) -> Duration {
        Duration::from_secs(self.events_timeout_secs)
    }

    pub fn status_page_timeout(&self) -> Duration {
        Duration::from_secs(self.status_page_timeout_secs)
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.user_agent.trim().is_empty() {
            return Err("user_agent cannot be empty".to_string());
        }

        if self.refresh_interval_secs == 0 {
            return Err("refresh_interval_secs must be greater than 0".to_string());
        }

        if self.events_timeout_secs == 0
            || self.status_page_timeout_secs == 0
            || self.feed_timeout_secs == 0
        {
            return Err("upstream timeouts must be greater than 0".to_string());
        }

        let urls = [
            ("aws_events_url", &self.aws_events_url),
            ("aws_rss_url", &self.aws_rss_url),
            ("azure_status_url", &self.azure_status_url),
            ("azure_rss_url", &self.azure_rss_url),
            ("gcp_incidents_url", &self.gcp_incidents_url),
            ("gcp_feed_url", &self.gcp_feed_url),
        ];
        for (field, url) in urls {
            if url.trim().is_empty() {
                return Err(format!("{} cannot be empty", field));
            }
        }

        if let Some(origin) = &self.cors_origin {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(format!("cors_origin must be an http(s) origin, got '{}'", origin));
            }
        }

        Ok(())
    }
}
