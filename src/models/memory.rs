// Process and system memory models, leak tracking state

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One poll of one process. `timestamp` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMemorySnapshot {
    pub pid: u32,
    pub name: String,
    pub private_bytes: u64,
    pub timestamp: i64,
}

/// System-wide sample taken once per refresh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSample {
    pub timestamp: i64,
    pub cpu_usage_percent: f64,
    pub memory_used: u64,
    pub memory_total: u64,
}

impl SystemSample {
    pub fn memory_usage_percent(&self) -> f64 {
        if self.memory_total > 0 {
            (self.memory_used as f64 / self.memory_total as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Leak state machine position of one tracked process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "count")]
pub enum GrowthState {
    Idle,
    Growing(u32),
    Flagged,
}

/// Presentation-level classification of a tracked process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeakClassification {
    Normal,
    Growing,
    Leak,
}

/// Per-process tracking state; created on first sighting and dropped when the pid disappears.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakTrackState {
    pub pid: u32,
    pub name: String,
    pub previous_bytes: u64,
    pub last_timestamp: Option<i64>,
    pub growth_rate_mb_per_min: f64,
    pub consecutive_growth_count: u32,
    pub is_flagged_leak: bool,
}

impl LeakTrackState {
    pub(crate) fn new(pid: u32, name: String, bytes: u64, timestamp: Option<i64>) -> Self {
        Self {
            pid,
            name,
            previous_bytes: bytes,
            last_timestamp: timestamp,
            growth_rate_mb_per_min: 0.0,
            consecutive_growth_count: 0,
            is_flagged_leak: false,
        }
    }

    pub fn growth_state(&self) -> GrowthState {
        if self.is_flagged_leak {
            GrowthState::Flagged
        } else if self.consecutive_growth_count > 0 {
            GrowthState::Growing(self.consecutive_growth_count)
        } else {
            GrowthState::Idle
        }
    }
}

/// Leak or early-warning entry for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakReport {
    pub pid: u32,
    pub name: String,
    pub growth_rate_mb_per_min: f64,
    pub consecutive_growth_count: u32,
}

impl From<&LeakTrackState> for LeakReport {
    fn from(s: &LeakTrackState) -> Self {
        Self {
            pid: s.pid,
            name: s.name.clone(),
            growth_rate_mb_per_min: s.growth_rate_mb_per_min,
            consecutive_growth_count: s.consecutive_growth_count,
        }
    }
}

/// One entry of the bounded memory history ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryHistoryEntry {
    pub timestamp: i64,
    pub memory_used: u64,
    pub process_private_bytes: HashMap<u32, u64>,
}
