//! Cache health assessment.

use serde::Serialize;

use crate::cache::CacheStats;

/// Hit rate (percent) below which the cache is flagged as ineffective.
pub const LOW_HIT_RATE_THRESHOLD: f64 = 50.0;

/// Lookups needed before the hit rate is judged at all.
pub const LOW_HIT_RATE_MIN_REQUESTS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// More than two issues is unhealthy, one or two is degraded.
    pub fn from_issue_count(issues: usize) -> Self {
        match issues {
            0 => HealthStatus::Healthy,
            1 | 2 => HealthStatus::Degraded,
            _ => HealthStatus::Unhealthy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistentLayerStatus {
    Reachable,
    Unreachable,
    Disabled,
}

// == Health Report ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Human-readable description of each flagged issue
    pub issues: Vec<String>,
    pub memory_items: usize,
    pub persistent_layer: PersistentLayerStatus,
    pub hit_rate: f64,
    /// Time of the check, RFC 3339
    pub checked_at: String,
}

impl HealthReport {
    /// Applies the health rules to a snapshot of the cache.
    pub fn assess(
        memory_items: usize,
        persistent_layer: PersistentLayerStatus,
        stats: &CacheStats,
    ) -> Self {
        let mut issues = Vec::new();

        if memory_items == 0 {
            issues.push("Memory cache is empty".to_string());
        }
        if persistent_layer == PersistentLayerStatus::Unreachable {
            issues.push("Persistent store is unreachable".to_string());
        }

        let hit_rate = stats.hit_rate();
        if stats.total_requests() >= LOW_HIT_RATE_MIN_REQUESTS && hit_rate < LOW_HIT_RATE_THRESHOLD
        {
            issues.push(format!("Hit rate is low ({hit_rate:.1}%)"));
        }

        Self {
            status: HealthStatus::from_issue_count(issues.len()),
            issues,
            memory_items,
            persistent_layer,
            hit_rate,
            checked_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_unhealthy(&self) -> bool {
        self.status == HealthStatus::Unhealthy
    }
}
