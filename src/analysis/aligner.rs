// Put two independently timed periods on a shared relative axis.

use serde::{Deserialize, Serialize};

use crate::models::Period;

/// How the difference trace pairs samples of the two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentStrategy {
    /// Pair by index. Assumes both periods were sampled at the same cadence.
    #[default]
    Positional,
    /// Evaluate period2 at each of period1's offsets by linear interpolation.
    TimeInterpolated,
}

/// A value at an offset (ms) from its period's start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedPoint {
    pub offset_ms: i64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub period1: Vec<AlignedPoint>,
    pub period2: Vec<AlignedPoint>,
    /// Axis spans `[0, axis_end_ms]`.
    pub axis_end_ms: i64,
}

/// Shifts both periods so each starts at offset 0. No resampling: each keeps its own density.
pub fn overlay(p1: &Period, p2: &Period) -> Overlay {
    Overlay {
        period1: relative_points(p1),
        period2: relative_points(p2),
        axis_end_ms: p1.duration_ms().max(p2.duration_ms()),
    }
}

/// Index-paired difference (`p2 - p1`), length `max(len1, len2)`.
///
/// Missing values count as 0. The offset of point `i` always comes from period1's
/// `i`-th sample, or 0 once period1 is exhausted.
pub fn difference(p1: &Period, p2: &Period) -> Vec<AlignedPoint> {
    let s1 = p1.samples();
    let s2 = p2.samples();
    let len = s1.len().max(s2.len());

    (0..len)
        .map(|i| {
            let (offset_ms, p1_val) = match s1.get(i) {
                Some(s) => (s.timestamp - p1.start(), s.value),
                None => (0, 0.0),
            };
            let p2_val = s2.get(i).map_or(0.0, |s| s.value);
            AlignedPoint {
                offset_ms,
                value: p2_val - p1_val,
            }
        })
        .collect()
}

pub fn difference_with(p1: &Period, p2: &Period, strategy: AlignmentStrategy) -> Vec<AlignedPoint> {
    match strategy {
        AlignmentStrategy::Positional => difference(p1, p2),
        AlignmentStrategy::TimeInterpolated => interpolated_difference(p1, p2),
    }
}

/// Evaluates period2 at period1's offsets. Offsets outside period2's range take its
/// nearest end value. An empty period1 yields period2 itself (p1 counts as 0);
/// an empty period2 counts as 0.
fn interpolated_difference(p1: &Period, p2: &Period) -> Vec<AlignedPoint> {
    let first = relative_points(p1);
    let second = relative_points(p2);

    if first.is_empty() {
        return second;
    }

    first
        .iter()
        .map(|a| AlignedPoint {
            offset_ms: a.offset_ms,
            value: value_at(&second, a.offset_ms).unwrap_or(0.0) - a.value,
        })
        .collect()
}

fn relative_points(p: &Period) -> Vec<AlignedPoint> {
    p.samples()
        .iter()
        .map(|s| AlignedPoint {
            offset_ms: s.timestamp - p.start(),
            value: s.value,
        })
        .collect()
}

/// Linear interpolation over points sorted by offset; clamps outside the range.
fn value_at(points: &[AlignedPoint], offset_ms: i64) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    if offset_ms <= first.offset_ms {
        return Some(first.value);
    }
    if offset_ms >= last.offset_ms {
        return Some(last.value);
    }

    let idx = points.partition_point(|p| p.offset_ms <= offset_ms);
    let lo = points[idx - 1];
    let hi = points[idx];
    if hi.offset_ms == lo.offset_ms {
        return Some(hi.value);
    }
    let t = (offset_ms - lo.offset_ms) as f64 / (hi.offset_ms - lo.offset_ms) as f64;
    Some(lo.value + (hi.value - lo.value) * t)
}
