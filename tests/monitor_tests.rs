// Refresh orchestration tests

mod common;

use chrono::{Local, TimeZone};
use common::MB;
use perfwatch::models::{ComparisonWindow, MetricKind, MonitorEvent, Verdict};
use perfwatch::monitor::{Monitor, MonitorSettings, RefreshInput};
use perfwatch::sources::AcquisitionError;

fn memory_input(timestamp: i64, used_percent: u64) -> RefreshInput {
    RefreshInput {
        timestamp,
        system: Some(common::system(timestamp, 10.0, used_percent, 100)),
        processes: None,
    }
}

fn low_memory_events(events: &[MonitorEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, MonitorEvent::SystemMemoryLow { .. }))
        .count()
}

#[test]
fn test_first_update_reported_once() {
    let mut m = Monitor::new(MonitorSettings::default());
    assert!(m.refresh(RefreshInput::default()).first_update);
    assert!(!m.refresh(RefreshInput::default()).first_update);
    assert_eq!(m.refresh_count(), 2);
}

#[test]
fn test_memory_pressure_hysteresis() {
    let mut m = Monitor::new(MonitorSettings::default());
    let fired: Vec<usize> = [50, 91, 92, 86, 95, 84, 91]
        .iter()
        .enumerate()
        .map(|(i, &used)| low_memory_events(&m.refresh(memory_input(i as i64, used)).events))
        .collect();
    assert_eq!(fired, vec![0, 1, 0, 0, 0, 0, 1]);
}

#[test]
fn test_memory_pressure_ignores_unknown_total() {
    let mut m = Monitor::new(MonitorSettings::default());
    let input = RefreshInput {
        timestamp: 1,
        system: Some(common::system(1, 0.0, 0, 0)),
        processes: None,
    };
    assert!(m.refresh(input).events.is_empty());
}

#[test]
fn test_failed_acquisition_keeps_tracks() {
    let mut m = Monitor::new(MonitorSettings::default());
    m.refresh(RefreshInput {
        timestamp: 0,
        system: None,
        processes: Some(common::poll(0, &[(1, MB), (2, MB)])),
    });
    assert_eq!(m.detector().tracked_count(), 2);

    // a failed poll is not an empty process table
    m.refresh(RefreshInput {
        timestamp: 1_000,
        system: None,
        processes: None,
    });
    assert_eq!(m.detector().tracked_count(), 2);
    assert_eq!(m.memory_history().len(), 1);
    assert_eq!(m.state().top_private_bytes.len(), 2);
}

#[test]
fn test_refresh_emits_leak_event() {
    let mut m = Monitor::new(MonitorSettings::default());
    let mut leaks = 0;
    for i in 0..7u64 {
        let outcome = m.refresh(RefreshInput {
            timestamp: i as i64 * 60_000,
            system: None,
            processes: Some(common::poll(i as i64 * 60_000, &[(9, i * 30 * MB)])),
        });
        leaks += outcome
            .events
            .iter()
            .filter(|e| matches!(e, MonitorEvent::LeakDetected { pid: 9, .. }))
            .count();
    }
    assert_eq!(leaks, 1);
    let state = m.state();
    assert_eq!(state.potential_leaks.len(), 1);
    assert_eq!(state.potential_leaks[0].pid, 9);
    assert!(state.growing.is_empty());
}

#[test]
fn test_leak_detection_can_be_disabled() {
    let mut m = Monitor::new(MonitorSettings {
        leak_detection: false,
        ..MonitorSettings::default()
    });
    for i in 0..7u64 {
        let outcome = m.refresh(RefreshInput {
            timestamp: i as i64 * 60_000,
            system: None,
            processes: Some(common::poll(i as i64 * 60_000, &[(9, i * 30 * MB)])),
        });
        assert!(outcome.events.is_empty());
    }
    assert!(m.state().potential_leaks.is_empty());
    m.set_leak_detection(true);
    assert!(m.detector().is_enabled());
}

#[test]
fn test_state_sparklines_and_top_processes() {
    let mut m = Monitor::new(MonitorSettings {
        top_processes: 2,
        ..MonitorSettings::default()
    });
    m.refresh(RefreshInput {
        timestamp: 5,
        system: Some(common::system(5, 42.0, 25, 100)),
        processes: Some(common::poll(5, &[(1, 10 * MB), (2, 30 * MB), (3, 20 * MB)])),
    });
    let state = m.state();
    assert_eq!(state.timestamp, 5);
    assert_eq!(state.refresh_count, 1);
    assert_eq!(state.tracked_processes, 3);

    let cpu = state.cpu_sparkline.expect("cpu sparkline");
    assert_eq!(cpu.values, vec![42.0]);
    assert_eq!(cpu.bound, 100.0);
    let mem = state.memory_sparkline.expect("memory sparkline");
    assert_eq!(mem.values, vec![25.0]);

    let private = state.private_bytes_sparkline.expect("private bytes sparkline");
    assert_eq!(private.values, vec![60.0]);
    assert!((private.bound - 66.0).abs() < 1e-9);

    let top: Vec<u32> = state.top_private_bytes.iter().map(|p| p.pid).collect();
    assert_eq!(top, vec![2, 3]);
    assert_eq!(m.top_by_private_bytes(10).len(), 3);
}

#[test]
fn test_refresh_records_metrics_and_history() {
    let mut m = Monitor::new(MonitorSettings {
        history_size: 2,
        ..MonitorSettings::default()
    });
    for i in 0..3 {
        m.refresh(RefreshInput {
            timestamp: i,
            system: Some(common::system(i, 5.0, 50, 100)),
            processes: Some(common::poll(i, &[(1, MB)])),
        });
    }
    assert_eq!(m.metrics().len(MetricKind::CpuUsage), 3);
    assert_eq!(m.metrics().len(MetricKind::MemoryUsage), 3);
    assert_eq!(m.memory_history().len(), 2);
    assert_eq!(m.memory_history().latest().map(|e| e.memory_used), Some(50));
}

#[test]
fn test_compare_periods_requires_samples_on_both_sides() {
    let mut m = Monitor::new(MonitorSettings::default());
    let event = m.compare_periods(
        MetricKind::CpuUsage,
        common::period("Yesterday", 0, &[50.0]),
        common::period("Today", 0, &[]),
    );
    assert!(event.is_none());
    assert!(m.state().comparison.is_none());

    let event = m.compare_periods(
        MetricKind::CpuUsage,
        common::period("Yesterday", 0, &[50.0, 50.0]),
        common::period("Today", 0, &[55.0, 55.0, 55.0]),
    );
    match event {
        Some(MonitorEvent::ComparisonUpdated {
            metric,
            period1,
            period2,
            result,
        }) => {
            assert_eq!(metric, MetricKind::CpuUsage);
            assert_eq!(period1, "Yesterday");
            assert_eq!(period2, "Today");
            assert_eq!(result.verdict, Verdict::Worse);
        }
        other => panic!("unexpected {other:?}"),
    }

    let snapshot = m.state().comparison.expect("comparison in state");
    assert_eq!(snapshot.difference.len(), 3);
    assert_eq!(snapshot.axis_end_ms, 3_000);
    assert_eq!(snapshot.period2_summary.count(), 3);
}

#[test]
fn test_compare_window_rolling() {
    let now_ms = 1_700_000_000_000;
    let now = Local.timestamp_millis_opt(now_ms).single().expect("valid time");
    let mut m = Monitor::new(MonitorSettings::default());

    let err = m
        .compare_window(MetricKind::CpuUsage, ComparisonWindow::Rolling { secs: 10 }, now)
        .unwrap_err();
    assert!(matches!(err, AcquisitionError::UnknownMetric(_)));

    for i in 0..20 {
        let ts = now_ms - 20_000 + i * 1_000;
        let cpu = if i < 10 { 50.0 } else { 40.0 };
        m.refresh(RefreshInput {
            timestamp: ts,
            system: Some(common::system(ts, cpu, 10, 100)),
            processes: None,
        });
    }

    let event = m
        .compare_window(MetricKind::CpuUsage, ComparisonWindow::Rolling { secs: 10 }, now)
        .expect("history available");
    match event {
        Some(MonitorEvent::ComparisonUpdated { period1, period2, result, .. }) => {
            assert_eq!(period1, "Previous");
            assert_eq!(period2, "Current");
            assert_eq!(result.period1_avg, 50.0);
            assert_eq!(result.period2_avg, 40.0);
            assert_eq!(result.verdict, Verdict::Better);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(m.comparison().period1().map(|p| p.samples().len()), Some(10));
}

#[test]
fn test_compare_window_without_samples_in_range() {
    let now_ms = 1_700_000_000_000;
    let now = Local.timestamp_millis_opt(now_ms).single().expect("valid time");
    let mut m = Monitor::new(MonitorSettings::default());
    m.refresh(RefreshInput {
        timestamp: now_ms - 5_000,
        system: Some(common::system(now_ms - 5_000, 10.0, 10, 100)),
        processes: None,
    });
    let event = m
        .compare_window(MetricKind::MemoryUsage, ComparisonWindow::Rolling { secs: 10 }, now)
        .expect("history available");
    assert!(event.is_none());
}
