use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    /// Seconds since the server started.
    pub uptime: f64,
}

// Liveness only; upstream reachability is reported through the cache.
pub fn health_report(started_at: Instant) -> HealthReport {
    HealthReport {
        status: "ok",
        uptime: started_at.elapsed().as_secs_f64(),
    }
}
