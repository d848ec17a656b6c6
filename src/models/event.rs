// Typed events published to the presentation layer

use serde::{Deserialize, Serialize};

use super::{ComparisonResult, MetricKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum MonitorEvent {
    /// Rising edge of the leak condition for one process.
    #[serde(rename_all = "camelCase")]
    LeakDetected {
        pid: u32,
        name: String,
        growth_rate_mb_per_min: f64,
    },
    #[serde(rename_all = "camelCase")]
    ComparisonUpdated {
        metric: MetricKind,
        period1: String,
        period2: String,
        result: ComparisonResult,
    },
    #[serde(rename_all = "camelCase")]
    SystemMemoryLow { usage_percent: f64 },
}
