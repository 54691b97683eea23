use serde::{Deserialize, Serialize};
use std::fmt;

/// Shared status vocabulary every provider is mapped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    #[default]
    Operational,
    Informational,
    Degraded,
    Disruption,
    Maintenance,
}

impl ServiceStatus {
    /// Severity used when several signals apply to one entity.
    ///
    /// Maintenance is never derived for a service, it only shows up on
    /// events, so it ranks alongside informational.
    pub fn rank(self) -> u8 {
        match self {
            ServiceStatus::Operational => 0,
            ServiceStatus::Informational | ServiceStatus::Maintenance => 1,
            ServiceStatus::Degraded => 2,
            ServiceStatus::Disruption => 3,
        }
    }

    /// Return whichever of the two is more severe, keeping `self` on ties.
    pub fn worst(self, other: ServiceStatus) -> ServiceStatus {
        if other.rank() > self.rank() { other } else { self }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::Operational => "operational",
            ServiceStatus::Informational => "informational",
            ServiceStatus::Degraded => "degraded",
            ServiceStatus::Disruption => "disruption",
            ServiceStatus::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Worst status over a set of services; operational when empty.
pub fn overall_status<'a, I>(statuses: I) -> ServiceStatus
where
    I: IntoIterator<Item = &'a ServiceStatus>,
{
    let worst = statuses
        .into_iter()
        .fold(ServiceStatus::Operational, |acc, s| acc.worst(*s));

    // Aggregates only use the four-step ladder.
    match worst {
        ServiceStatus::Maintenance => ServiceStatus::Informational,
        other => other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Resolved,
    Disruption,
    Degraded,
    Maintenance,
    Change,
    Informational,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventType::Resolved => "resolved",
            EventType::Disruption => "disruption",
            EventType::Degraded => "degraded",
            EventType::Maintenance => "maintenance",
            EventType::Change => "change",
            EventType::Informational => "informational",
        };
        f.write_str(s)
    }
}
