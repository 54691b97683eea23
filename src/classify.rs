//! Status and event classification.
//!
//! Every provider reports severity differently, so each gets its own status
//! classifier; they only share the output vocabulary. Event classification is a
//! single ordered keyword cascade: the first rule that matches wins.

use crate::models::{EventType, ServiceStatus};

const AWS_DISRUPTION_TERMS: &[&str] = &["disruption", "outage"];
const AWS_DEGRADED_TERMS: &[&str] = &["degraded", "increased error", "elevated error"];

/// Classify one AWS event from its description and status text.
pub fn aws_event_status(description: &str, status: &str) -> ServiceStatus {
    let text = format!("{}{}", description, status).to_lowercase();

    if contains_any(&text, AWS_DISRUPTION_TERMS) {
        ServiceStatus::Disruption
    } else if contains_any(&text, AWS_DEGRADED_TERMS) {
        ServiceStatus::Degraded
    } else {
        ServiceStatus::Informational
    }
}

/// Region cell counts for one row of the Azure status table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionCounts {
    pub good: u32,
    pub warning: u32,
    pub critical: u32,
    /// Regions where the service actually runs.
    pub total: u32,
}

impl RegionCounts {
    /// Count one `data-label` value. Blank and "not available" cells are
    /// regions the service doesn't run in and stay out of the denominator.
    pub fn record(&mut self, label: &str) {
        match label.trim().to_lowercase().as_str() {
            "good" => {
                self.good += 1;
                self.total += 1;
            }
            "warning" => {
                self.warning += 1;
                self.total += 1;
            }
            "critical" | "error" => {
                self.critical += 1;
                self.total += 1;
            }
            _ => {}
        }
    }

    /// Raw label reported alongside the normalized status.
    pub fn raw_label(&self) -> &'static str {
        if self.critical > 0 {
            "Critical"
        } else if self.warning > 0 {
            "Warning"
        } else {
            "Good"
        }
    }
}

/// A lone failing region out of many must not read as a global disruption,
/// so Azure status is driven by the share of affected regions.
pub fn azure_region_status(counts: &RegionCounts) -> ServiceStatus {
    let denominator = counts.total.max(1) as f64;

    if counts.critical > 0 {
        let crit_ratio = counts.critical as f64 / denominator;
        if crit_ratio >= 0.5 {
            ServiceStatus::Disruption
        } else if crit_ratio >= 0.2 {
            ServiceStatus::Degraded
        } else {
            ServiceStatus::Informational
        }
    } else if counts.warning > 0 {
        let warn_ratio = counts.warning as f64 / denominator;
        if warn_ratio >= 0.5 {
            ServiceStatus::Degraded
        } else if warn_ratio >= 0.15 {
            ServiceStatus::Informational
        } else {
            ServiceStatus::Operational
        }
    } else {
        ServiceStatus::Operational
    }
}

/// Map a GCP incident severity; unknown or missing values are informational.
pub fn gcp_severity_status(severity: Option<&str>) -> ServiceStatus {
    match severity.map(|s| s.trim().to_uppercase()).as_deref() {
        Some("SERVICE_OUTAGE") => ServiceStatus::Disruption,
        Some("SERVICE_DISRUPTION") => ServiceStatus::Degraded,
        Some("AVAILABLE") => ServiceStatus::Operational,
        _ => ServiceStatus::Informational,
    }
}

/// Ordered rules; earlier entries win.
const EVENT_RULES: &[(EventType, &[&str])] = &[
    (
        EventType::Resolved,
        &[
            "resolved",
            "mitigated",
            "recovery complete",
            "operating normally",
            "service has been restored",
        ],
    ),
    (EventType::Disruption, &["disruption", "outage", "unavailable"]),
    (
        EventType::Degraded,
        &[
            "degraded",
            "degradation",
            "intermittent",
            "increased error",
            "elevated error",
        ],
    ),
    (EventType::Maintenance, &["maintenance", "planned"]),
    (
        EventType::Change,
        &["policy", "change", "update", "retirement", "deprecation"],
    ),
];

pub fn classify_event(title: &str, description: &str) -> EventType {
    let text = format!("{} {}", title, description).to_lowercase();

    EVENT_RULES
        .iter()
        .find(|(_, keywords)| contains_any(&text, keywords))
        .map(|(event_type, _)| *event_type)
        .unwrap_or(EventType::Informational)
}

/// Case-insensitive substring containment in either direction. Blank names
/// never match, otherwise they would match everything.
pub fn fuzzy_match(catalog_name: &str, signal_name: &str) -> bool {
    let catalog = catalog_name.trim().to_lowercase();
    let signal = signal_name.trim().to_lowercase();

    if catalog.is_empty() || signal.is_empty() {
        return false;
    }

    catalog.contains(&signal) || signal.contains(&catalog)
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}
