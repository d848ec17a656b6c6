// Domain models shared by the analysis core, the monitor and the worker

mod comparison;
mod event;
mod memory;
mod metric;
mod sample;

pub use comparison::{ComparisonResult, Direction, Verdict};
pub use event::MonitorEvent;
pub use memory::{
    GrowthState, LeakClassification, LeakReport, LeakTrackState, MemoryHistoryEntry,
    ProcessMemorySnapshot, SystemSample,
};
pub use metric::{ComparisonWindow, MetricKind, PeriodRange};
pub use sample::{Period, Sample, TimeSeriesSummary};
