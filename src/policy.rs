// Named policy thresholds. Algorithms read them through the policy structs below;
// the `Default` impls use the constants and `[policy]` in config.toml may override them.

use serde::Deserialize;

/// |percent change| below this is "Similar".
pub const SIGNIFICANCE_PERCENT: f64 = 5.0;
/// Baseline averages with |avg| at or below this yield a 0% change.
pub const BASELINE_EPSILON: f64 = 0.001;

/// Growth rate (MB/min) above which a sustained streak is a leak.
pub const LEAK_RATE_MB_PER_MIN: f64 = 10.0;
/// Consecutive growth samples required for a leak.
pub const LEAK_MIN_CONSECUTIVE: u32 = 5;
/// Consecutive growth samples for the early-warning "growing" list.
pub const GROWING_MIN_CONSECUTIVE: u32 = 3;

/// Auto-scale headroom over the observed maximum.
pub const AUTO_SCALE_HEADROOM: f64 = 1.1;
/// Auto-scale bound never drops below this.
pub const AUTO_SCALE_FLOOR: f64 = 10.0;

/// System memory usage (%) that raises a low-memory event.
pub const LOW_MEMORY_PERCENT: f64 = 90.0;
/// Usage must fall this many points below the threshold before the event re-arms.
pub const LOW_MEMORY_HYSTERESIS: f64 = 5.0;

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComparisonPolicy {
    pub significance_percent: f64,
    pub baseline_epsilon: f64,
}

impl Default for ComparisonPolicy {
    fn default() -> Self {
        Self {
            significance_percent: SIGNIFICANCE_PERCENT,
            baseline_epsilon: BASELINE_EPSILON,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LeakPolicy {
    pub rate_threshold_mb_per_min: f64,
    pub min_consecutive_growth: u32,
    pub growing_min_consecutive: u32,
}

impl Default for LeakPolicy {
    fn default() -> Self {
        Self {
            rate_threshold_mb_per_min: LEAK_RATE_MB_PER_MIN,
            min_consecutive_growth: LEAK_MIN_CONSECUTIVE,
            growing_min_consecutive: GROWING_MIN_CONSECUTIVE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct MemoryPressurePolicy {
    pub threshold_percent: f64,
    pub hysteresis_percent: f64,
}

impl Default for MemoryPressurePolicy {
    fn default() -> Self {
        Self {
            threshold_percent: LOW_MEMORY_PERCENT,
            hysteresis_percent: LOW_MEMORY_HYSTERESIS,
        }
    }
}

/// `[policy]` section; every field optional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub comparison: ComparisonPolicy,
    pub leak: LeakPolicy,
    pub memory_pressure: MemoryPressurePolicy,
}
