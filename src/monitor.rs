// Per-refresh orchestration of the core components.
// A refresh consumes an already-acquired snapshot and mutates state in one synchronous
// pass; readers only ever see the finished `MonitorState` built afterwards.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::analysis::{
    AlignedPoint, AlignmentStrategy, ComparisonEngine, GrowthLeakDetector, RollingWindowBuffer,
    SparklineSnapshot,
};
use crate::history::{MemoryHistory, MetricHistory, fetch_period};
use crate::models::{
    ComparisonResult, ComparisonWindow, LeakReport, MemoryHistoryEntry, MetricKind,
    MonitorEvent, Period, ProcessMemorySnapshot, Sample, SystemSample, TimeSeriesSummary,
};
use crate::policy::{BYTES_PER_MB, MemoryPressurePolicy, PolicyConfig};
use crate::sources::AcquisitionError;

#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub sparkline_capacity: usize,
    /// Entries kept in the memory history ring.
    pub history_size: usize,
    /// Samples kept per metric for comparisons.
    pub metric_retention: usize,
    pub leak_detection: bool,
    pub alignment: AlignmentStrategy,
    /// Length of the top-by-private-bytes list in the published state.
    pub top_processes: usize,
    pub policy: PolicyConfig,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            sparkline_capacity: 60,
            history_size: 180,
            metric_retention: 43_200,
            leak_detection: true,
            alignment: AlignmentStrategy::Positional,
            top_processes: 10,
            policy: PolicyConfig::default(),
        }
    }
}

/// Everything acquired for one tick. A `None` part means acquisition failed this tick;
/// the matching components are left untouched.
#[derive(Debug, Clone, Default)]
pub struct RefreshInput {
    pub timestamp: i64,
    pub system: Option<SystemSample>,
    pub processes: Option<HashMap<u32, ProcessMemorySnapshot>>,
}

#[derive(Debug, Clone, Default)]
pub struct RefreshOutcome {
    pub events: Vec<MonitorEvent>,
    /// True only for the first refresh of this monitor.
    pub first_update: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSnapshot {
    pub metric: MetricKind,
    pub period1: String,
    pub period2: String,
    pub period1_summary: TimeSeriesSummary,
    pub period2_summary: TimeSeriesSummary,
    pub result: ComparisonResult,
    pub alignment: AlignmentStrategy,
    pub difference: Vec<AlignedPoint>,
    pub axis_end_ms: i64,
}

/// Immutable view published after each refresh.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorState {
    pub timestamp: i64,
    pub refresh_count: u64,
    pub system: Option<SystemSample>,
    pub cpu_sparkline: Option<SparklineSnapshot>,
    pub memory_sparkline: Option<SparklineSnapshot>,
    pub private_bytes_sparkline: Option<SparklineSnapshot>,
    pub potential_leaks: Vec<LeakReport>,
    pub growing: Vec<LeakReport>,
    pub top_private_bytes: Vec<ProcessMemorySnapshot>,
    pub tracked_processes: usize,
    pub comparison: Option<ComparisonSnapshot>,
}

/// Low-memory warning with hysteresis: fires once at the threshold, re-arms below
/// `threshold - hysteresis`.
#[derive(Debug, Clone)]
struct MemoryPressureGate {
    policy: MemoryPressurePolicy,
    warning_issued: bool,
}

impl MemoryPressureGate {
    fn check(&mut self, system: &SystemSample) -> Option<f64> {
        if system.memory_total == 0 {
            return None;
        }
        let usage = system.memory_usage_percent();
        if usage >= self.policy.threshold_percent && !self.warning_issued {
            self.warning_issued = true;
            return Some(usage);
        }
        if usage < self.policy.threshold_percent - self.policy.hysteresis_percent {
            self.warning_issued = false;
        }
        None
    }
}

pub struct Monitor {
    settings: MonitorSettings,
    detector: GrowthLeakDetector,
    cpu_sparkline: RollingWindowBuffer,
    memory_sparkline: RollingWindowBuffer,
    private_bytes_sparkline: RollingWindowBuffer,
    memory_history: MemoryHistory,
    metrics: MetricHistory,
    pressure: MemoryPressureGate,
    comparison: ComparisonEngine,
    comparison_metric: Option<MetricKind>,
    last_system: Option<SystemSample>,
    last_processes: Vec<ProcessMemorySnapshot>,
    last_timestamp: i64,
    refresh_count: u64,
    first_update_done: bool,
}

impl Monitor {
    pub fn new(settings: MonitorSettings) -> Self {
        let mut detector = GrowthLeakDetector::new(settings.policy.leak);
        detector.set_enabled(settings.leak_detection);
        Self {
            detector,
            cpu_sparkline: RollingWindowBuffer::new(settings.sparkline_capacity),
            memory_sparkline: RollingWindowBuffer::new(settings.sparkline_capacity),
            private_bytes_sparkline: RollingWindowBuffer::with_auto_scale(
                settings.sparkline_capacity,
            ),
            memory_history: MemoryHistory::new(settings.history_size),
            metrics: MetricHistory::new(settings.metric_retention),
            pressure: MemoryPressureGate {
                policy: settings.policy.memory_pressure,
                warning_issued: false,
            },
            comparison: ComparisonEngine::with_policy(settings.policy.comparison, false),
            comparison_metric: None,
            last_system: None,
            last_processes: Vec::new(),
            last_timestamp: 0,
            refresh_count: 0,
            first_update_done: false,
            settings,
        }
    }

    pub fn refresh(&mut self, input: RefreshInput) -> RefreshOutcome {
        let mut events = Vec::new();

        if let Some(system) = input.system {
            let memory_usage = system.memory_usage_percent();
            self.cpu_sparkline.push(system.cpu_usage_percent);
            self.memory_sparkline.push(memory_usage);
            self.metrics.record(
                MetricKind::CpuUsage,
                Sample::new(system.timestamp, system.cpu_usage_percent),
            );
            self.metrics.record(
                MetricKind::MemoryUsage,
                Sample::new(system.timestamp, memory_usage),
            );
            if let Some(usage_percent) = self.pressure.check(&system) {
                events.push(MonitorEvent::SystemMemoryLow { usage_percent });
            }
            self.last_system = Some(system);
        }

        if let Some(processes) = input.processes {
            events.extend(self.detector.observe_snapshot(&processes));

            let total_private: u64 = processes.values().map(|p| p.private_bytes).sum();
            self.private_bytes_sparkline
                .push(total_private as f64 / BYTES_PER_MB);

            self.memory_history.push(MemoryHistoryEntry {
                timestamp: input.timestamp,
                memory_used: input.system.map_or(0, |s| s.memory_used),
                process_private_bytes: processes
                    .iter()
                    .map(|(pid, p)| (*pid, p.private_bytes))
                    .collect(),
            });

            let mut procs: Vec<ProcessMemorySnapshot> = processes.into_values().collect();
            procs.sort_by(|a, b| {
                b.private_bytes
                    .cmp(&a.private_bytes)
                    .then(a.pid.cmp(&b.pid))
            });
            self.last_processes = procs;
        }

        self.last_timestamp = input.timestamp;
        self.refresh_count += 1;
        let first_update = !self.first_update_done;
        self.first_update_done = true;

        RefreshOutcome {
            events,
            first_update,
        }
    }

    /// Fetches both periods of `window` from the metric history and compares them.
    ///
    /// Returns `Ok(None)` when either period has no samples; the engine still holds
    /// the periods but no `ComparisonUpdated` is raised.
    pub fn compare_window(
        &mut self,
        metric: MetricKind,
        window: ComparisonWindow,
        now: DateTime<Local>,
    ) -> Result<Option<MonitorEvent>, AcquisitionError> {
        let (baseline, current) = window.ranges(now);
        let source = self.metrics.source(metric);
        let period1 = fetch_period(&source, &baseline)?;
        let period2 = fetch_period(&source, &current)?;
        Ok(self.compare_periods(metric, period1, period2))
    }

    pub fn compare_periods(
        &mut self,
        metric: MetricKind,
        period1: Period,
        period2: Period,
    ) -> Option<MonitorEvent> {
        if self.comparison.higher_is_better() != metric.higher_is_better() {
            self.comparison
                .set_higher_is_better(metric.higher_is_better());
        }
        self.comparison.set_periods(period1, period2);
        self.comparison_metric = Some(metric);

        let (p1, p2) = (self.comparison.period1()?, self.comparison.period2()?);
        if p1.summary().is_empty() || p2.summary().is_empty() {
            return None;
        }
        let result = *self.comparison.result()?;
        Some(MonitorEvent::ComparisonUpdated {
            metric,
            period1: p1.name().to_string(),
            period2: p2.name().to_string(),
            result,
        })
    }

    /// Builds the publishable state from the last completed refresh.
    pub fn state(&self) -> MonitorState {
        let top = self.settings.top_processes;
        MonitorState {
            timestamp: self.last_timestamp,
            refresh_count: self.refresh_count,
            system: self.last_system,
            cpu_sparkline: Some(self.cpu_sparkline.sparkline()),
            memory_sparkline: Some(self.memory_sparkline.sparkline()),
            private_bytes_sparkline: Some(self.private_bytes_sparkline.sparkline()),
            potential_leaks: self.detector.potential_leaks(),
            growing: self.detector.growing(),
            top_private_bytes: self.top_by_private_bytes(top),
            tracked_processes: self.detector.tracked_count(),
            comparison: self.comparison_snapshot(),
        }
    }

    fn comparison_snapshot(&self) -> Option<ComparisonSnapshot> {
        let metric = self.comparison_metric?;
        let p1 = self.comparison.period1()?;
        let p2 = self.comparison.period2()?;
        if p1.summary().is_empty() || p2.summary().is_empty() {
            return None;
        }
        let alignment = self.settings.alignment;
        Some(ComparisonSnapshot {
            metric,
            period1: p1.name().to_string(),
            period2: p2.name().to_string(),
            period1_summary: *p1.summary(),
            period2_summary: *p2.summary(),
            result: *self.comparison.result()?,
            alignment,
            difference: self.comparison.difference(alignment)?,
            axis_end_ms: p1.duration_ms().max(p2.duration_ms()),
        })
    }

    /// Processes of the last snapshot with the most private bytes, largest first.
    pub fn top_by_private_bytes(&self, count: usize) -> Vec<ProcessMemorySnapshot> {
        self.last_processes.iter().take(count).cloned().collect()
    }

    pub fn set_leak_detection(&mut self, enabled: bool) {
        self.detector.set_enabled(enabled);
    }

    pub fn detector(&self) -> &GrowthLeakDetector {
        &self.detector
    }

    pub fn metrics(&self) -> &MetricHistory {
        &self.metrics
    }

    pub fn memory_history(&self) -> &MemoryHistory {
        &self.memory_history
    }

    pub fn comparison(&self) -> &ComparisonEngine {
        &self.comparison
    }

    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }
}
