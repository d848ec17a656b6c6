use serde::Deserialize;

use crate::analysis::AlignmentStrategy;
use crate::models::{ComparisonWindow, MetricKind};
use crate::monitor::MonitorSettings;
use crate::policy::PolicyConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub monitoring: MonitoringConfig,
    pub publishing: PublishingConfig,
    pub comparison: ComparisonConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub sample_interval_ms: u64,
    /// How often to log monitor stats (tracked processes, leaks, refreshes) at INFO level.
    pub stats_log_interval_secs: u64,
    /// Points kept per sparkline.
    pub sparkline_capacity: usize,
    /// Refreshes kept in the memory history ring (180 = 6 minutes at 2s).
    pub history_size: usize,
    #[serde(default = "default_metric_retention")]
    pub metric_retention: usize,
    #[serde(default = "default_leak_detection")]
    pub leak_detection: bool,
    #[serde(default = "default_top_processes")]
    pub top_processes: usize,
}

fn default_metric_retention() -> usize {
    43_200
}

fn default_leak_detection() -> bool {
    true
}

fn default_top_processes() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Capacity of the event broadcast channel (slow subscribers may lag).
    pub event_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComparisonConfig {
    pub metric: MetricKind,
    pub window: ComparisonWindow,
    #[serde(default)]
    pub alignment: AlignmentStrategy,
    pub interval_secs: u64,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            sparkline_capacity: self.monitoring.sparkline_capacity,
            history_size: self.monitoring.history_size,
            metric_retention: self.monitoring.metric_retention,
            leak_detection: self.monitoring.leak_detection,
            alignment: self.comparison.alignment,
            top_processes: self.monitoring.top_processes,
            policy: self.policy,
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.monitoring.sample_interval_ms > 0,
            "monitoring.sample_interval_ms must be > 0, got {}",
            self.monitoring.sample_interval_ms
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.monitoring.sparkline_capacity > 1,
            "monitoring.sparkline_capacity must be > 1, got {}",
            self.monitoring.sparkline_capacity
        );
        anyhow::ensure!(
            self.monitoring.history_size > 0,
            "monitoring.history_size must be > 0, got {}",
            self.monitoring.history_size
        );
        anyhow::ensure!(
            self.monitoring.metric_retention > 0,
            "monitoring.metric_retention must be > 0, got {}",
            self.monitoring.metric_retention
        );
        anyhow::ensure!(
            self.publishing.event_capacity > 0,
            "publishing.event_capacity must be > 0, got {}",
            self.publishing.event_capacity
        );
        anyhow::ensure!(
            self.comparison.interval_secs > 0,
            "comparison.interval_secs must be > 0, got {}",
            self.comparison.interval_secs
        );
        if let ComparisonWindow::Rolling { secs } = self.comparison.window {
            anyhow::ensure!(
                secs > 0,
                "comparison.window.secs must be > 0, got {}",
                secs
            );
        }

        let p = &self.policy;
        anyhow::ensure!(
            p.comparison.significance_percent >= 0.0,
            "policy.comparison.significance_percent must be >= 0, got {}",
            p.comparison.significance_percent
        );
        anyhow::ensure!(
            p.comparison.baseline_epsilon >= 0.0,
            "policy.comparison.baseline_epsilon must be >= 0, got {}",
            p.comparison.baseline_epsilon
        );
        anyhow::ensure!(
            p.leak.rate_threshold_mb_per_min >= 0.0,
            "policy.leak.rate_threshold_mb_per_min must be >= 0, got {}",
            p.leak.rate_threshold_mb_per_min
        );
        anyhow::ensure!(
            p.leak.min_consecutive_growth > 0,
            "policy.leak.min_consecutive_growth must be > 0, got {}",
            p.leak.min_consecutive_growth
        );
        anyhow::ensure!(
            p.leak.growing_min_consecutive > 0
                && p.leak.growing_min_consecutive <= p.leak.min_consecutive_growth,
            "policy.leak.growing_min_consecutive must be in 1..={}, got {}",
            p.leak.min_consecutive_growth,
            p.leak.growing_min_consecutive
        );
        anyhow::ensure!(
            p.memory_pressure.threshold_percent > 0.0
                && p.memory_pressure.threshold_percent <= 100.0,
            "policy.memory_pressure.threshold_percent must be in (0, 100], got {}",
            p.memory_pressure.threshold_percent
        );
        anyhow::ensure!(
            p.memory_pressure.hysteresis_percent >= 0.0,
            "policy.memory_pressure.hysteresis_percent must be >= 0, got {}",
            p.memory_pressure.hysteresis_percent
        );
        Ok(())
    }
}
