//! Refresh orchestration across all providers

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, instrument};

use crate::config::Config;
use crate::errors::{Result, StatusError};
use crate::models::Provider;
use crate::services::ProviderFetcher;
use crate::services::aws::AwsFetcher;
use crate::services::azure::AzureFetcher;
use crate::services::gcp::GcpFetcher;
use crate::services::upstream::UpstreamClient;
use crate::state::StatusCache;

/// Outcome of one refresh cycle.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub refreshed: Vec<Provider>,
    pub failed: Vec<Provider>,
}

/// Runs every provider fetch concurrently and publishes the successes.
///
/// Cycles are serialized: a trigger that arrives while a cycle is running
/// waits for it to finish and then runs its own, so publishes for a provider
/// always land in trigger order.
pub struct Refresher {
    fetchers: Vec<Arc<dyn ProviderFetcher>>,
    cache: Arc<StatusCache>,
    cycle: Mutex<()>,
}

impl Refresher {
    pub fn new(fetchers: Vec<Arc<dyn ProviderFetcher>>, cache: Arc<StatusCache>) -> Self {
        Self {
            fetchers,
            cache,
            cycle: Mutex::new(()),
        }
    }

    /// Wire up the three provider fetchers from configuration.
    pub fn from_config(config: &Config, cache: Arc<StatusCache>) -> Result<Self> {
        let client = UpstreamClient::new(&config.user_agent)?;
        let fetchers: Vec<Arc<dyn ProviderFetcher>> = vec![
            Arc::new(AwsFetcher::new(client.clone(), config)),
            Arc::new(AzureFetcher::new(client.clone(), config)),
            Arc::new(GcpFetcher::new(client, config)),
        ];

        Ok(Self::new(fetchers, cache))
    }

    pub fn cache(&self) -> &Arc<StatusCache> {
        &self.cache
    }

    /// Run one cycle. Never fails: a provider that errors or panics keeps its
    /// previous cache entry. The cycle runs on its own task, so it completes
    /// and publishes even if the caller stops waiting.
    pub async fn refresh_all(self: &Arc<Self>) -> RefreshReport {
        let refresher = Arc::clone(self);
        let started_at = Utc::now();

        match tokio::spawn(async move { refresher.run_cycle().await }).await {
            Ok(report) => report,
            Err(e) => {
                error!("Refresh cycle aborted: {}", e);
                RefreshReport {
                    started_at,
                    completed_at: Utc::now(),
                    refreshed: Vec::new(),
                    failed: self.fetchers.iter().map(|f| f.provider()).collect(),
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn run_cycle(&self) -> RefreshReport {
        let _cycle = self.cycle.lock().await;
        let started_at = Utc::now();
        info!("Refreshing cloud status for {} providers", self.fetchers.len());

        let (providers, handles): (Vec<Provider>, Vec<_>) = self
            .fetchers
            .iter()
            .map(|fetcher| {
                let fetcher = Arc::clone(fetcher);
                let provider = fetcher.provider();
                (provider, tokio::spawn(async move { fetcher.fetch().await }))
            })
            .unzip();

        let outcomes = join_all(handles).await;

        let mut refreshed = Vec::new();
        let mut failed = Vec::new();

        for (provider, outcome) in providers.into_iter().zip(outcomes) {
            match outcome.map_err(StatusError::from).and_then(|result| result) {
                Ok(status) => {
                    self.cache.publish(provider, status, Utc::now()).await;
                    refreshed.push(provider);
                }
                Err(e) => {
                    error!("{} fetch failed: {}", provider, e);
                    failed.push(provider);
                }
            }
        }

        let report = RefreshReport {
            started_at,
            completed_at: Utc::now(),
            refreshed,
            failed,
        };

        info!(
            "Status refresh complete: {} refreshed, {} failed",
            report.refreshed.len(),
            report.failed.len()
        );

        report
    }

    /// Refresh immediately, then on every `every` tick, forever.
    pub async fn run_schedule(self: Arc<Self>, every: Duration) {
        info!("Starting scheduled refresh every {}s", every.as_secs());

        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.refresh_all().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CacheEntry, ProviderStatus, ServiceStatus};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum Behaviour {
        Succeed,
        Fail,
        Panic,
    }

    struct FakeFetcher {
        provider: Provider,
        behaviour: std::sync::Mutex<Behaviour>,
        calls: AtomicUsize,
        in_flight: AtomicBool,
        overlapped: AtomicBool,
        delay: Duration,
    }

    impl FakeFetcher {
        fn new(provider: Provider, behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                provider,
                behaviour: std::sync::Mutex::new(behaviour),
                calls: AtomicUsize::new(0),
                in_flight: AtomicBool::new(false),
                overlapped: AtomicBool::new(false),
                delay: Duration::from_millis(0),
            })
        }

        fn slow(provider: Provider) -> Arc<Self> {
            Arc::new(Self {
                provider,
                behaviour: std::sync::Mutex::new(Behaviour::Succeed),
                calls: AtomicUsize::new(0),
                in_flight: AtomicBool::new(false),
                overlapped: AtomicBool::new(false),
                delay: Duration::from_millis(50),
            })
        }

        fn set(&self, behaviour: Behaviour) {
            *self.behaviour.lock().unwrap() = behaviour;
        }
    }

    #[async_trait]
    impl ProviderFetcher for FakeFetcher {
        fn provider(&self) -> Provider {
            self.provider
        }

        async fn fetch(&self) -> Result<ProviderStatus> {
            if self.in_flight.swap(true, Ordering::SeqCst) {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(self.delay).await;
            self.in_flight.store(false, Ordering::SeqCst);

            let behaviour = *self.behaviour.lock().unwrap();
            match behaviour {
                Behaviour::Succeed => {}
                Behaviour::Fail => return Err(StatusError::Other("upstream exploded".into())),
                Behaviour::Panic => panic!("fetcher panicked"),
            }

            Ok(ProviderStatus::assemble(
                self.provider,
                Vec::new(),
                Vec::new(),
                Some(call),
            ))
        }
    }

    fn refresher(fetchers: &[Arc<FakeFetcher>]) -> Arc<Refresher> {
        let fetchers = fetchers
            .iter()
            .map(|f| Arc::clone(f) as Arc<dyn ProviderFetcher>)
            .collect();
        Arc::new(Refresher::new(fetchers, Arc::new(StatusCache::new())))
    }

    #[tokio::test]
    async fn test_all_providers_published() {
        let fakes = [
            FakeFetcher::new(Provider::Aws, Behaviour::Succeed),
            FakeFetcher::new(Provider::Azure, Behaviour::Succeed),
            FakeFetcher::new(Provider::Gcp, Behaviour::Succeed),
        ];
        let refresher = refresher(&fakes);

        let report = refresher.refresh_all().await;
        assert_eq!(report.refreshed, vec![Provider::Aws, Provider::Azure, Provider::Gcp]);
        assert!(report.failed.is_empty());

        for provider in Provider::ALL {
            let entry = refresher.cache().get(provider).await;
            let status = entry.status.unwrap();
            assert_eq!(status.provider, provider);
            assert_eq!(status.overall_status, ServiceStatus::Operational);
            assert!(entry.last_updated.is_some());
        }
    }

    #[tokio::test]
    async fn test_failure_preserves_previous_entry() {
        let fakes = [
            FakeFetcher::new(Provider::Aws, Behaviour::Succeed),
            FakeFetcher::new(Provider::Azure, Behaviour::Succeed),
            FakeFetcher::new(Provider::Gcp, Behaviour::Succeed),
        ];
        let refresher = refresher(&fakes);
        refresher.refresh_all().await;

        let azure_before = refresher.cache().get(Provider::Azure).await;
        let gcp_before = refresher.cache().get(Provider::Gcp).await;

        fakes[1].set(Behaviour::Fail);
        tokio::time::sleep(Duration::from_millis(5)).await;
        let report = refresher.refresh_all().await;

        assert_eq!(report.failed, vec![Provider::Azure]);
        assert_eq!(refresher.cache().get(Provider::Azure).await, azure_before);

        let gcp_after = refresher.cache().get(Provider::Gcp).await;
        assert_eq!(gcp_after.status.unwrap().active_incidents, Some(2));
        assert!(gcp_after.last_updated > gcp_before.last_updated);
    }

    #[tokio::test]
    async fn test_panicking_fetcher_is_isolated() {
        let fakes = [
            FakeFetcher::new(Provider::Aws, Behaviour::Panic),
            FakeFetcher::new(Provider::Gcp, Behaviour::Succeed),
        ];
        let refresher = refresher(&fakes);

        let report = refresher.refresh_all().await;
        assert_eq!(report.failed, vec![Provider::Aws]);
        assert_eq!(report.refreshed, vec![Provider::Gcp]);
        assert_eq!(refresher.cache().get(Provider::Aws).await, CacheEntry::default());
    }

    #[tokio::test]
    async fn test_all_failing_leaves_cache_empty() {
        let fakes = [
            FakeFetcher::new(Provider::Aws, Behaviour::Fail),
            FakeFetcher::new(Provider::Azure, Behaviour::Fail),
            FakeFetcher::new(Provider::Gcp, Behaviour::Fail),
        ];
        let refresher = refresher(&fakes);

        let report = refresher.refresh_all().await;
        assert!(report.refreshed.is_empty());
        assert_eq!(report.failed.len(), 3);

        let snapshot = refresher.cache().snapshot().await;
        assert!(snapshot.aws.status.is_none());
        assert!(snapshot.azure.last_updated.is_none());
        assert!(snapshot.gcp.status.is_none());
    }

    #[tokio::test]
    async fn test_overlapping_triggers_are_serialized() {
        let fakes = [FakeFetcher::slow(Provider::Aws), FakeFetcher::slow(Provider::Gcp)];
        let refresher = refresher(&fakes);

        let a = tokio::spawn({
            let r = Arc::clone(&refresher);
            async move { r.refresh_all().await }
        });
        let b = tokio::spawn({
            let r = Arc::clone(&refresher);
            async move { r.refresh_all().await }
        });
        let (a, b) = (a.await.unwrap(), b.await.unwrap());

        assert_eq!(a.refreshed.len(), 2);
        assert_eq!(b.refreshed.len(), 2);
        for fake in &fakes {
            assert_eq!(fake.calls.load(Ordering::SeqCst), 2);
            assert!(!fake.overlapped.load(Ordering::SeqCst));
        }

        let latest = refresher.cache().get(Provider::Aws).await;
        assert_eq!(latest.status.unwrap().active_incidents, Some(2));
    }

    #[tokio::test]
    async fn test_abandoned_trigger_still_publishes() {
        let fakes = [FakeFetcher::slow(Provider::Aws), FakeFetcher::slow(Provider::Azure)];
        let refresher = refresher(&fakes);

        let abandoned =
            tokio::time::timeout(Duration::from_millis(5), refresher.refresh_all()).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(refresher.cache().get(Provider::Aws).await.status.is_some());
        assert!(refresher.cache().get(Provider::Azure).await.status.is_some());

        let report = refresher.refresh_all().await;
        assert_eq!(report.refreshed.len(), 2);
        for fake in &fakes {
            assert_eq!(fake.calls.load(Ordering::SeqCst), 2);
            assert!(!fake.overlapped.load(Ordering::SeqCst));
        }
    }
}
