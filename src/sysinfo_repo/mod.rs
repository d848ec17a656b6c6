// Process and system samples via sysinfo

mod linux;

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use sysinfo::{ProcessesToUpdate, System};
use tracing::instrument;

use crate::models::{ProcessMemorySnapshot, SystemSample};
use crate::sources::{AcquisitionError, ProcessSampleSource, SystemSampleSource};

pub struct SysinfoRepo {
    sys: Mutex<System>,
    last_cpu_refresh: Mutex<Option<(Instant, f64)>>,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoRepo {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();
        Self {
            sys: Mutex::new(sys),
            last_cpu_refresh: Mutex::new(None),
        }
    }

    fn lock_sys(&self) -> Result<std::sync::MutexGuard<'_, System>, AcquisitionError> {
        self.sys
            .lock()
            .map_err(|_| AcquisitionError::LockPoisoned { what: "sysinfo" })
    }

    /// Global CPU usage; sysinfo needs `MINIMUM_CPU_UPDATE_INTERVAL` between refreshes,
    /// so faster callers get the cached value.
    fn cpu_usage(&self, sys: &mut System) -> f64 {
        let now = Instant::now();
        let Ok(mut guard) = self.last_cpu_refresh.lock() else {
            sys.refresh_cpu_all();
            return 0.0;
        };
        match *guard {
            Some((prev_ts, prev_usage))
                if now.duration_since(prev_ts) < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL =>
            {
                prev_usage
            }
            Some(_) => {
                sys.refresh_cpu_all();
                let usage = f64::from(sys.global_cpu_usage()).clamp(0.0, 100.0);
                *guard = Some((now, usage));
                usage
            }
            None => {
                // first call only establishes the baseline
                sys.refresh_cpu_all();
                *guard = Some((now, 0.0));
                0.0
            }
        }
    }
}

pub(crate) fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, operation = "get_timestamp", "system time error");
            0
        })
}

impl ProcessSampleSource for SysinfoRepo {
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "poll_processes"))]
    fn poll(&self) -> Result<HashMap<u32, ProcessMemorySnapshot>, AcquisitionError> {
        let mut sys = self.lock_sys()?;
        sys.refresh_processes(ProcessesToUpdate::All, true);
        let timestamp = now_ms();

        Ok(sys
            .processes()
            .iter()
            .map(|(pid, p)| {
                let pid = pid.as_u32();
                let private_bytes =
                    linux::read_private_bytes_linux(pid).unwrap_or_else(|| p.memory());
                (
                    pid,
                    ProcessMemorySnapshot {
                        pid,
                        name: p.name().to_string_lossy().into_owned(),
                        private_bytes,
                        timestamp,
                    },
                )
            })
            .collect())
    }
}

impl SystemSampleSource for SysinfoRepo {
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "sample_system"))]
    fn sample(&self) -> Result<SystemSample, AcquisitionError> {
        let mut sys = self.lock_sys()?;
        sys.refresh_memory();
        let cpu_usage_percent = self.cpu_usage(&mut sys);

        let total = sys.total_memory();
        let used = total.saturating_sub(sys.available_memory());
        Ok(SystemSample {
            timestamp: now_ms(),
            cpu_usage_percent,
            memory_used: used,
            memory_total: total,
        })
    }
}
