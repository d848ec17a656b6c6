// Worker integration tests: fake sources, tick, shutdown, assert published state and events

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use common::MB;
use perfwatch::models::{
    ComparisonWindow, MetricKind, MonitorEvent, ProcessMemorySnapshot, SystemSample,
};
use perfwatch::monitor::{Monitor, MonitorSettings, MonitorState};
use perfwatch::sources::{AcquisitionError, ProcessSampleSource, SystemSampleSource};
use perfwatch::worker::{WorkerConfig, WorkerDeps, spawn};
use tokio::sync::{broadcast, watch};

/// One process growing 30 MB per poll, polls one minute apart.
#[derive(Default)]
struct LeakyProcesses {
    polls: AtomicU64,
}

impl ProcessSampleSource for LeakyProcesses {
    fn poll(&self) -> Result<HashMap<u32, ProcessMemorySnapshot>, AcquisitionError> {
        let n = self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(common::poll(n as i64 * 60_000, &[(77, 100 * MB + n * 30 * MB)]))
    }
}

struct FixedSystem;

impl SystemSampleSource for FixedSystem {
    fn sample(&self) -> Result<SystemSample, AcquisitionError> {
        Ok(common::system(0, 20.0, 40, 100))
    }
}

struct BrokenSystem;

impl SystemSampleSource for BrokenSystem {
    fn sample(&self) -> Result<SystemSample, AcquisitionError> {
        Err(AcquisitionError::LockPoisoned { what: "sensor" })
    }
}

fn worker_config() -> WorkerConfig {
    WorkerConfig {
        sample_interval_ms: 10,
        stats_log_interval_secs: 3600,
        comparison_interval_secs: 3600,
        comparison_metric: MetricKind::CpuUsage,
        comparison_window: ComparisonWindow::Rolling { secs: 60 },
    }
}

#[tokio::test]
async fn worker_publishes_state_and_returns_monitor_on_shutdown() {
    let (events_tx, _events_rx) = broadcast::channel(16);
    let (state_tx, state_rx) = watch::channel(Arc::new(MonitorState::default()));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = spawn(
        WorkerDeps {
            process_source: Arc::new(LeakyProcesses::default()),
            system_source: Arc::new(FixedSystem),
            events_tx,
            state_tx,
            shutdown_rx,
        },
        Monitor::new(MonitorSettings::default()),
        worker_config(),
    );

    tokio::time::sleep(tokio::time::Duration::from_millis(120)).await;
    let _ = shutdown_tx.send(());
    let monitor = handle.await.unwrap();

    assert!(monitor.refresh_count() >= 1);
    let state = state_rx.borrow().clone();
    assert_eq!(state.refresh_count, monitor.refresh_count());
    assert_eq!(state.system.map(|s| s.cpu_usage_percent), Some(20.0));
    assert_eq!(state.tracked_processes, 1);
}

#[tokio::test]
async fn worker_broadcasts_leak_event_once() {
    let (events_tx, mut events_rx) = broadcast::channel(64);
    let (state_tx, _state_rx) = watch::channel(Arc::new(MonitorState::default()));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = spawn(
        WorkerDeps {
            process_source: Arc::new(LeakyProcesses::default()),
            system_source: Arc::new(FixedSystem),
            events_tx,
            state_tx,
            shutdown_rx,
        },
        Monitor::new(MonitorSettings::default()),
        worker_config(),
    );

    let event = tokio::time::timeout(tokio::time::Duration::from_secs(5), events_rx.recv())
        .await
        .expect("leak event within timeout")
        .expect("channel open");
    match event {
        MonitorEvent::LeakDetected { pid, .. } => assert_eq!(pid, 77),
        other => panic!("unexpected event {other:?}"),
    }

    // let a few more ticks run; the flag must not re-fire
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    let _ = shutdown_tx.send(());
    let monitor = handle.await.unwrap();

    assert!(monitor.refresh_count() >= 6);
    while let Ok(extra) = events_rx.try_recv() {
        assert!(
            !matches!(extra, MonitorEvent::LeakDetected { .. }),
            "leak event fired twice"
        );
    }
    assert_eq!(monitor.detector().potential_leaks().len(), 1);
}

#[tokio::test]
async fn worker_tolerates_failed_system_sample() {
    let (events_tx, _events_rx) = broadcast::channel(16);
    let (state_tx, state_rx) = watch::channel(Arc::new(MonitorState::default()));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = spawn(
        WorkerDeps {
            process_source: Arc::new(LeakyProcesses::default()),
            system_source: Arc::new(BrokenSystem),
            events_tx,
            state_tx,
            shutdown_rx,
        },
        Monitor::new(MonitorSettings::default()),
        worker_config(),
    );

    tokio::time::sleep(tokio::time::Duration::from_millis(60)).await;
    let _ = shutdown_tx.send(());
    let monitor = handle.await.unwrap();

    assert!(monitor.refresh_count() >= 1);
    let state = state_rx.borrow().clone();
    assert!(state.system.is_none());
    assert_eq!(state.tracked_processes, 1);
    assert_eq!(monitor.metrics().len(MetricKind::CpuUsage), 0);
}
