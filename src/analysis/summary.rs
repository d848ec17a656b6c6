// min/max/avg/count over a sample set

use crate::models::{Sample, TimeSeriesSummary};

/// Single pass; min/max seeded from the first sample. Empty input gives `count == 0`.
pub fn summarize(samples: &[Sample]) -> TimeSeriesSummary {
    let Some(first) = samples.first() else {
        return TimeSeriesSummary::empty();
    };

    let mut min = first.value;
    let mut max = first.value;
    let mut sum = 0.0;
    for s in samples {
        sum += s.value;
        min = min.min(s.value);
        max = max.max(s.value);
    }

    TimeSeriesSummary::from_parts(min, max, sum / samples.len() as f64, samples.len())
}

/// Same as [`summarize`] for bare values (e.g. a sparkline buffer).
pub fn summarize_values(values: &[f64]) -> TimeSeriesSummary {
    let Some(&first) = values.first() else {
        return TimeSeriesSummary::empty();
    };

    let (min, max, sum) = values
        .iter()
        .fold((first, first, 0.0), |(min, max, sum), &v| {
            (min.min(v), max.max(v), sum + v)
        });

    TimeSeriesSummary::from_parts(min, max, sum / values.len() as f64, values.len())
}
