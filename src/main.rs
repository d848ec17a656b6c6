use std::sync::Arc;

use anyhow::Result;
use perfwatch::*;
use tokio::sync::{broadcast, watch};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(
        version = %version::banner(),
        sample_interval_ms = app_config.monitoring.sample_interval_ms,
        metric = app_config.comparison.metric.as_str(),
        "starting"
    );

    let (events_tx, events_rx) =
        broadcast::channel::<models::MonitorEvent>(app_config.publishing.event_capacity);
    let (state_tx, state_rx) = watch::channel(Arc::new(monitor::MonitorState::default()));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let sysinfo_repo = Arc::new(sysinfo_repo::SysinfoRepo::new());
    let monitor = monitor::Monitor::new(app_config.monitor_settings());

    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            process_source: sysinfo_repo.clone(),
            system_source: sysinfo_repo,
            events_tx,
            state_tx,
            shutdown_rx,
        },
        monitor,
        worker::WorkerConfig {
            sample_interval_ms: app_config.monitoring.sample_interval_ms,
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
            comparison_interval_secs: app_config.comparison.interval_secs,
            comparison_metric: app_config.comparison.metric,
            comparison_window: app_config.comparison.window,
        },
    );

    let subscriber_handle = tokio::spawn(log_events(events_rx));

    shutdown_signal().await;
    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    subscriber_handle.abort();

    match worker_handle.await {
        Ok(monitor) => {
            let state = state_rx.borrow().clone();
            tracing::info!(
                refreshes = monitor.refresh_count(),
                tracked_processes = state.tracked_processes,
                potential_leaks = state.potential_leaks.len(),
                "worker stopped"
            );
        }
        Err(e) => tracing::error!(error = %e, "worker task failed"),
    }

    Ok(())
}

/// Event subscriber: dumps every event as JSON at debug level.
async fn log_events(mut rx: broadcast::Receiver<models::MonitorEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => tracing::debug!(event = %json, "event"),
                Err(e) => tracing::warn!(error = %e, "event serialization failed"),
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
