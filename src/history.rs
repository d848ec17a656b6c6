// In-memory histories: per-metric samples (source of comparison periods)
// and the bounded per-refresh memory ring.

use std::collections::{HashMap, VecDeque};

use crate::models::{MemoryHistoryEntry, MetricKind, Period, PeriodRange, Sample};
use crate::sources::{AcquisitionError, PeriodSampleSource};

/// Bounded sample series per metric. Samples are expected in timestamp order.
#[derive(Debug, Clone)]
pub struct MetricHistory {
    retention: usize,
    series: HashMap<MetricKind, VecDeque<Sample>>,
}

impl MetricHistory {
    /// Keeps at most `retention` samples per metric.
    pub fn new(retention: usize) -> Self {
        Self {
            retention,
            series: HashMap::new(),
        }
    }

    pub fn record(&mut self, metric: MetricKind, sample: Sample) {
        let series = self.series.entry(metric).or_default();
        series.push_back(sample);
        while series.len() > self.retention {
            series.pop_front();
        }
    }

    pub fn len(&self, metric: MetricKind) -> usize {
        self.series.get(&metric).map_or(0, VecDeque::len)
    }

    /// Oldest and newest timestamps recorded for `metric`.
    pub fn time_range(&self, metric: MetricKind) -> Option<(i64, i64)> {
        let series = self.series.get(&metric)?;
        Some((series.front()?.timestamp, series.back()?.timestamp))
    }

    /// View of one metric usable as a [`PeriodSampleSource`].
    pub fn source(&self, metric: MetricKind) -> MetricSeries<'_> {
        MetricSeries {
            metric,
            samples: self.series.get(&metric),
        }
    }
}

pub struct MetricSeries<'a> {
    metric: MetricKind,
    samples: Option<&'a VecDeque<Sample>>,
}

impl PeriodSampleSource for MetricSeries<'_> {
    fn fetch(&self, start: i64, end: i64) -> Result<Vec<Sample>, AcquisitionError> {
        let samples = self
            .samples
            .ok_or(AcquisitionError::UnknownMetric(self.metric.as_str()))?;
        let lo = samples.partition_point(|s| s.timestamp < start);
        let hi = samples.partition_point(|s| s.timestamp < end);
        Ok(samples.range(lo..hi.max(lo)).copied().collect())
    }
}

/// Fetches `range` from `source` into a named [`Period`].
pub fn fetch_period<S: PeriodSampleSource + ?Sized>(
    source: &S,
    range: &PeriodRange,
) -> Result<Period, AcquisitionError> {
    let samples = source.fetch(range.start, range.end)?;
    Ok(Period::new(range.name, range.start, range.end, samples))
}

/// Ring of per-refresh memory entries, oldest evicted first.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    max_entries: usize,
    entries: VecDeque<MemoryHistoryEntry>,
}

impl MemoryHistory {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            entries: VecDeque::with_capacity(max_entries),
        }
    }

    pub fn push(&mut self, entry: MemoryHistoryEntry) {
        self.entries.push_back(entry);
        self.trim();
    }

    /// Shrinking the limit drops the oldest entries immediately.
    pub fn set_max_entries(&mut self, max_entries: usize) {
        self.max_entries = max_entries;
        self.trim();
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&MemoryHistoryEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemoryHistoryEntry> {
        self.entries.iter()
    }

    /// Private-bytes series of one pid across the ring, oldest first.
    pub fn process_series(&self, pid: u32) -> Vec<Sample> {
        self.entries
            .iter()
            .filter_map(|e| {
                e.process_private_bytes
                    .get(&pid)
                    .map(|&b| Sample::new(e.timestamp, b as f64))
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn trim(&mut self) {
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }
}
