// Background refresh worker.
// Each tick acquires a full snapshot first, then runs one synchronous monitor refresh,
// then swaps the finished state into the watch channel and broadcasts the events.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, oneshot, watch};
use tokio::time::{Duration, Instant, interval};
use tracing::Instrument;

use crate::format::{format_bytes, format_growth_rate};
use crate::models::{
    ComparisonWindow, MetricKind, MonitorEvent, ProcessMemorySnapshot, SystemSample,
};
use crate::monitor::{Monitor, MonitorState, RefreshInput};
use crate::sources::{AcquisitionError, ProcessSampleSource, SystemSampleSource};
use crate::sysinfo_repo::now_ms;

/// Rate limit for the "no subscribers" message.
const NO_RECEIVERS_WARN_INTERVAL: Duration = Duration::from_secs(60);

/// Sources, channels, and shutdown for the worker.
pub struct WorkerDeps {
    pub process_source: Arc<dyn ProcessSampleSource>,
    pub system_source: Arc<dyn SystemSampleSource>,
    pub events_tx: broadcast::Sender<MonitorEvent>,
    pub state_tx: watch::Sender<Arc<MonitorState>>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

/// Worker timing and comparison config.
pub struct WorkerConfig {
    pub sample_interval_ms: u64,
    /// How often to log monitor stats (real seconds).
    pub stats_log_interval_secs: u64,
    /// How often to recompute the period comparison (real seconds).
    pub comparison_interval_secs: u64,
    pub comparison_metric: MetricKind,
    pub comparison_window: ComparisonWindow,
}

/// Spawns the refresh loop. The monitor is returned when the worker shuts down.
pub fn spawn(
    deps: WorkerDeps,
    mut monitor: Monitor,
    config: WorkerConfig,
) -> tokio::task::JoinHandle<Monitor> {
    let WorkerDeps {
        process_source,
        system_source,
        events_tx,
        state_tx,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        sample_interval_ms,
        stats_log_interval_secs,
        comparison_interval_secs,
        comparison_metric,
        comparison_window,
    } = config;

    let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", sample_interval_ms);

    let run = async move {
        let mut tick = interval(Duration::from_millis(sample_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut comparison_tick = interval(Duration::from_secs(comparison_interval_secs));
        comparison_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut events_sent_total: u64 = 0;
        let mut last_no_receivers_warn: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let input = RefreshInput {
                        timestamp: now_ms(),
                        system: acquire_system(&system_source).await,
                        processes: acquire_processes(&process_source).await,
                    };
                    let outcome = monitor.refresh(input);
                    state_tx.send_replace(Arc::new(monitor.state()));

                    if outcome.first_update {
                        tracing::info!(
                            tracked_processes = monitor.detector().tracked_count(),
                            "first refresh complete"
                        );
                    }
                    for event in outcome.events {
                        log_event(&event);
                        publish(
                            &events_tx,
                            event,
                            &mut events_sent_total,
                            &mut last_no_receivers_warn,
                        );
                    }
                }
                _ = comparison_tick.tick() => {
                    let now = chrono::Local::now();
                    match monitor.compare_window(comparison_metric, comparison_window, now) {
                        Ok(Some(event)) => {
                            state_tx.send_replace(Arc::new(monitor.state()));
                            log_event(&event);
                            publish(
                                &events_tx,
                                event,
                                &mut events_sent_total,
                                &mut last_no_receivers_warn,
                            );
                        }
                        Ok(None) => {
                            tracing::debug!(
                                operation = "compare_window",
                                metric = comparison_metric.as_str(),
                                "not enough samples to compare yet"
                            );
                        }
                        Err(e) => {
                            tracing::debug!(
                                error = %e,
                                operation = "compare_window",
                                "comparison skipped"
                            );
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    let detector = monitor.detector();
                    tracing::info!(
                        refreshes = monitor.refresh_count(),
                        tracked_processes = detector.tracked_count(),
                        potential_leaks = detector.potential_leaks().len(),
                        growing = detector.growing().len(),
                        events_sent_total,
                        event_subscribers = events_tx.receiver_count(),
                        top_private = %describe_top(&monitor.top_by_private_bytes(3)),
                        "monitor stats"
                    );
                }
            }
        }
        monitor
    };
    tokio::spawn(run.instrument(worker_span))
}

/// Runs a blocking source call off the runtime; failures are logged and yield `None`.
async fn acquire<T, F>(operation: &'static str, call: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AcquisitionError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| AcquisitionError::Join(e.to_string()))
        .and_then(|r| r);
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, operation, "acquisition failed");
            None
        }
    }
}

async fn acquire_system(source: &Arc<dyn SystemSampleSource>) -> Option<SystemSample> {
    let source = source.clone();
    acquire("sample_system", move || source.sample()).await
}

async fn acquire_processes(
    source: &Arc<dyn ProcessSampleSource>,
) -> Option<HashMap<u32, ProcessMemorySnapshot>> {
    let source = source.clone();
    acquire("poll_processes", move || source.poll()).await
}

fn publish(
    tx: &broadcast::Sender<MonitorEvent>,
    event: MonitorEvent,
    events_sent_total: &mut u64,
    last_no_receivers_warn: &mut Option<Instant>,
) {
    if tx.send(event).is_ok() {
        *events_sent_total += 1;
        return;
    }
    let should_warn =
        last_no_receivers_warn.is_none_or(|t| t.elapsed() >= NO_RECEIVERS_WARN_INTERVAL);
    if should_warn {
        tracing::debug!(
            operation = "broadcast_event",
            "No event subscribers; broadcast channel has no receivers"
        );
        *last_no_receivers_warn = Some(Instant::now());
    }
}

fn log_event(event: &MonitorEvent) {
    match event {
        MonitorEvent::LeakDetected {
            pid,
            name,
            growth_rate_mb_per_min,
        } => {
            tracing::warn!(
                pid,
                name = %name,
                growth_rate = %format_growth_rate(*growth_rate_mb_per_min),
                "potential memory leak detected"
            );
        }
        MonitorEvent::ComparisonUpdated {
            metric,
            period1,
            period2,
            result,
        } => {
            tracing::info!(
                metric = metric.as_str(),
                period1 = %period1,
                period2 = %period2,
                verdict = %result.label(),
                "comparison updated"
            );
        }
        MonitorEvent::SystemMemoryLow { usage_percent } => {
            tracing::warn!(usage_percent, "system memory low");
        }
    }
}

/// "name(pid)=size, ..." for the stats log line.
fn describe_top(processes: &[ProcessMemorySnapshot]) -> String {
    processes
        .iter()
        .map(|p| format!("{}({})={}", p.name, p.pid, format_bytes(p.private_bytes)))
        .collect::<Vec<_>>()
        .join(", ")
}
