pub mod aws;
pub mod azure;
pub mod feed;
pub mod gcp;
pub mod health;
pub mod refresh;
pub mod upstream;

use crate::errors::Result;
use crate::models::{Provider, ProviderStatus};
use async_trait::async_trait;
use tracing::warn;

/// One provider's ingestion pipeline.
#[async_trait]
pub trait ProviderFetcher: Send + Sync {
    fn provider(&self) -> Provider;

    /// Build a complete status snapshot. Upstream trouble degrades the result
    /// instead of failing it; an `Err` means the provider produced nothing.
    async fn fetch(&self) -> Result<ProviderStatus>;
}

/// Collapse a failed sub-fetch into an empty record set, logging the cause.
pub(crate) fn or_empty<T>(result: Result<Vec<T>>, provider: Provider, what: &str) -> Vec<T> {
    match result {
        Ok(records) => records,
        Err(e) => {
            warn!("{} {} fetch warning: {}", provider, what, e);
            Vec::new()
        }
    }
}
