// Fixed-capacity FIFO of samples for live sparklines, with optional auto-scaling.

use std::collections::VecDeque;

use serde::Serialize;

use crate::policy::{AUTO_SCALE_FLOOR, AUTO_SCALE_HEADROOM};

/// Default upper bound when auto-scaling is off (percent metrics).
pub const DEFAULT_FIXED_BOUND: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct RollingWindowBuffer {
    capacity: usize,
    values: VecDeque<f64>,
    auto_scale: bool,
    current_bound: f64,
    fixed_bound: f64,
}

/// Read-only copy of a buffer for renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SparklineSnapshot {
    pub capacity: usize,
    pub bound: f64,
    /// Oldest first.
    pub values: Vec<f64>,
}

impl SparklineSnapshot {
    /// `(x, y)` in `[0, 1]`: x spaced over `capacity - 1` steps from the left, y = value / bound.
    pub fn normalized_points(&self) -> Vec<(f64, f64)> {
        let steps = self.capacity.saturating_sub(1).max(1) as f64;
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64 / steps, normalize(v, self.bound)))
            .collect()
    }
}

impl RollingWindowBuffer {
    /// Fixed bound of 100, auto-scaling off.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
            auto_scale: false,
            current_bound: DEFAULT_FIXED_BOUND,
            fixed_bound: DEFAULT_FIXED_BOUND,
        }
    }

    pub fn with_auto_scale(capacity: usize) -> Self {
        let mut buffer = Self::new(capacity);
        buffer.set_auto_scale(true);
        buffer
    }

    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
        if self.auto_scale {
            self.rescale();
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
        if self.auto_scale {
            self.rescale();
        }
    }

    /// Oldest to newest.
    pub fn snapshot(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn sparkline(&self) -> SparklineSnapshot {
        SparklineSnapshot {
            capacity: self.capacity,
            bound: self.current_bound,
            values: self.snapshot(),
        }
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn current_bound(&self) -> f64 {
        self.current_bound
    }

    pub fn is_auto_scale(&self) -> bool {
        self.auto_scale
    }

    pub fn set_auto_scale(&mut self, enabled: bool) {
        self.auto_scale = enabled;
        if enabled {
            self.rescale();
        } else {
            self.current_bound = self.fixed_bound;
        }
    }

    /// Caller-supplied bound used while auto-scaling is off.
    pub fn set_fixed_bound(&mut self, bound: f64) {
        self.fixed_bound = bound;
        if !self.auto_scale {
            self.current_bound = bound;
        }
    }

    /// `clamp(value / current_bound, 0, 1)`.
    pub fn normalized(&self, value: f64) -> f64 {
        normalize(value, self.current_bound)
    }

    fn rescale(&mut self) {
        self.current_bound = match self.values.iter().copied().reduce(f64::max) {
            Some(max) => (max * AUTO_SCALE_HEADROOM).max(AUTO_SCALE_FLOOR),
            None => self.fixed_bound,
        };
    }
}

fn normalize(value: f64, bound: f64) -> f64 {
    if bound > 0.0 {
        (value / bound).clamp(0.0, 1.0)
    } else {
        0.0
    }
}
