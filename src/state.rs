use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::models::{CacheEntry, Provider, ProviderStatus};
use crate::services::refresh::Refresher;

/// Latest known status per provider.
///
/// Readers get clones; the refresher swaps whole entries, so a reader never
/// observes a half-built `ProviderStatus`.
#[derive(Debug)]
pub struct StatusCache {
    entries: RwLock<HashMap<Provider, CacheEntry>>,
}

/// Body of the aggregate status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub aws: CacheEntry,
    pub azure: CacheEntry,
    pub gcp: CacheEntry,
}

impl StatusCache {
    pub fn new() -> Self {
        let entries = Provider::ALL
            .iter()
            .map(|p| (*p, CacheEntry::default()))
            .collect();

        Self {
            entries: RwLock::new(entries),
        }
    }

    pub async fn get(&self, provider: Provider) -> CacheEntry {
        self.entries
            .read()
            .await
            .get(&provider)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        let entries = self.entries.read().await;
        let entry = |p: Provider| entries.get(&p).cloned().unwrap_or_default();

        StatusSnapshot {
            aws: entry(Provider::Aws),
            azure: entry(Provider::Azure),
            gcp: entry(Provider::Gcp),
        }
    }

    /// Replace a provider's entry in one assignment.
    pub(crate) async fn publish(&self, provider: Provider, status: ProviderStatus, at: DateTime<Utc>) {
        let entry = CacheEntry::fresh(status, at);
        self.entries.write().await.insert(provider, entry);
    }
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new()
    }
}

// App state
pub struct AppState {
    pub cache: Arc<StatusCache>,
    pub refresher: Arc<Refresher>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(cache: Arc<StatusCache>, refresher: Arc<Refresher>) -> Self {
        Self {
            cache,
            refresher,
            started_at: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_status(provider: Provider) -> ProviderStatus {
        ProviderStatus::assemble(provider, Vec::new(), Vec::new(), None)
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let cache = StatusCache::new();
        for provider in Provider::ALL {
            let entry = cache.get(provider).await;
            assert!(entry.status.is_none());
            assert!(entry.last_updated.is_none());
        }

        let json = serde_json::to_value(cache.snapshot().await).unwrap();
        assert_eq!(json["aws"]["status"], serde_json::Value::Null);
        assert_eq!(json["gcp"]["lastUpdated"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_publish_replaces_single_provider() {
        let cache = StatusCache::new();
        let at = Utc::now();
        cache.publish(Provider::Azure, empty_status(Provider::Azure), at).await;

        let azure = cache.get(Provider::Azure).await;
        assert_eq!(azure.last_updated, Some(at));
        assert_eq!(azure.status.unwrap().provider, Provider::Azure);

        let snapshot = cache.snapshot().await;
        assert!(snapshot.aws.status.is_none());
        assert!(snapshot.azure.status.is_some());
    }
}
