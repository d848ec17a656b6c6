// Samples, summaries and named comparison periods

use serde::{Deserialize, Serialize};

use crate::analysis::summarize;

/// One recorded value. `timestamp` is epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub timestamp: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// min/max/avg/count of a finite sample set.
///
/// When `count == 0` the derived fields hold NaN and the accessors return `None`;
/// check [`TimeSeriesSummary::is_empty`] before reading them.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesSummary {
    min: f64,
    max: f64,
    avg: f64,
    count: usize,
}

impl TimeSeriesSummary {
    pub(crate) fn empty() -> Self {
        Self {
            min: f64::NAN,
            max: f64::NAN,
            avg: f64::NAN,
            count: 0,
        }
    }

    pub(crate) fn from_parts(min: f64, max: f64, avg: f64, count: usize) -> Self {
        Self {
            min,
            max,
            avg,
            count,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn min(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.max)
    }

    pub fn avg(&self) -> Option<f64> {
        (!self.is_empty()).then_some(self.avg)
    }

    /// Average without the emptiness guard; NaN for an empty summary.
    pub(crate) fn raw_avg(&self) -> f64 {
        self.avg
    }
}

/// A named, time-bounded sample sequence. Immutable: replace the whole value to update it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    name: String,
    start: i64,
    end: i64,
    samples: Vec<Sample>,
    tag: Option<String>,
    summary: TimeSeriesSummary,
}

impl Period {
    pub fn new(name: impl Into<String>, start: i64, end: i64, samples: Vec<Sample>) -> Self {
        let summary = summarize(&samples);
        Self {
            name: name.into(),
            start,
            end,
            samples,
            tag: None,
            summary,
        }
    }

    /// Opaque presentation tag (e.g. a series color).
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn summary(&self) -> &TimeSeriesSummary {
        &self.summary
    }

    /// `end - start` in milliseconds, never negative.
    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).max(0)
    }
}
