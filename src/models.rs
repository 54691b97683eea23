pub mod provider;
pub mod status;

pub use provider::{CacheEntry, NormalizedEvent, NormalizedService, Provider, ProviderStatus};
pub use status::{EventType, ServiceStatus, overall_status};
