// Sample providers consumed by the core. Acquisition itself lives behind these traits.

use std::collections::HashMap;

use crate::models::{ProcessMemorySnapshot, Sample, SystemSample};

#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("{what} lock poisoned")]
    LockPoisoned { what: &'static str },
    #[error("sample task join: {0}")]
    Join(String),
    #[error("no samples recorded for {0}")]
    UnknownMetric(&'static str),
}

/// Samples for one metric within `[start, end)` (epoch ms), oldest first.
pub trait PeriodSampleSource {
    fn fetch(&self, start: i64, end: i64) -> Result<Vec<Sample>, AcquisitionError>;
}

/// Private bytes of every visible process, keyed by pid.
pub trait ProcessSampleSource: Send + Sync {
    fn poll(&self) -> Result<HashMap<u32, ProcessMemorySnapshot>, AcquisitionError>;
}

/// System-wide CPU and memory usage.
pub trait SystemSampleSource: Send + Sync {
    fn sample(&self) -> Result<SystemSample, AcquisitionError>;
}
