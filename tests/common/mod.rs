// Shared test helpers
#![allow(dead_code)]

use std::collections::HashMap;

use perfwatch::models::*;

pub const MB: u64 = 1024 * 1024;

/// Period starting at `start` with one sample per second.
pub fn period(name: &str, start: i64, values: &[f64]) -> Period {
    let samples = values
        .iter()
        .enumerate()
        .map(|(i, &v)| Sample::new(start + i as i64 * 1000, v))
        .collect();
    let end = start + values.len() as i64 * 1000;
    Period::new(name, start, end, samples)
}

/// Period with explicit `(timestamp, value)` samples.
pub fn period_at(name: &str, start: i64, end: i64, points: &[(i64, f64)]) -> Period {
    let samples = points.iter().map(|&(t, v)| Sample::new(t, v)).collect();
    Period::new(name, start, end, samples)
}

pub fn process(pid: u32, name: &str, private_bytes: u64, timestamp: i64) -> ProcessMemorySnapshot {
    ProcessMemorySnapshot {
        pid,
        name: name.into(),
        private_bytes,
        timestamp,
    }
}

/// One poll of `(pid, private bytes)` pairs taken at `timestamp`.
pub fn poll(timestamp: i64, procs: &[(u32, u64)]) -> HashMap<u32, ProcessMemorySnapshot> {
    procs
        .iter()
        .map(|&(pid, bytes)| (pid, process(pid, &format!("proc-{pid}"), bytes, timestamp)))
        .collect()
}

pub fn system(timestamp: i64, cpu: f64, used: u64, total: u64) -> SystemSample {
    SystemSample {
        timestamp,
        cpu_usage_percent: cpu,
        memory_used: used,
        memory_total: total,
    }
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
