// Two-period comparison: verdict, direction and percentage delta

use crate::analysis::aligner::{self, AlignedPoint, AlignmentStrategy, Overlay};
use crate::models::{ComparisonResult, Direction, Period, TimeSeriesSummary, Verdict};
use crate::policy::ComparisonPolicy;

/// Compares two summaries with the default policy (5% significance, 0.001 baseline epsilon).
///
/// Never fails. Empty summaries produce NaN averages that propagate into the result,
/// so check `count()` on both inputs first.
pub fn compare(
    s1: &TimeSeriesSummary,
    s2: &TimeSeriesSummary,
    higher_is_better: bool,
) -> ComparisonResult {
    compare_with(&ComparisonPolicy::default(), s1, s2, higher_is_better)
}

pub fn compare_with(
    policy: &ComparisonPolicy,
    s1: &TimeSeriesSummary,
    s2: &TimeSeriesSummary,
    higher_is_better: bool,
) -> ComparisonResult {
    let period1_avg = s1.raw_avg();
    let period2_avg = s2.raw_avg();
    let avg_difference = period2_avg - period1_avg;

    let avg_difference_percent = if period1_avg.abs() > policy.baseline_epsilon {
        (avg_difference / period1_avg) * 100.0
    } else {
        0.0
    };

    let (verdict, direction) = if avg_difference_percent.abs() < policy.significance_percent {
        (Verdict::Similar, Direction::None)
    } else if higher_is_better {
        if avg_difference > 0.0 {
            (Verdict::Better, Direction::Up)
        } else {
            (Verdict::Worse, Direction::Down)
        }
    } else if avg_difference < 0.0 {
        (Verdict::Better, Direction::Down)
    } else {
        (Verdict::Worse, Direction::Up)
    };

    ComparisonResult {
        period1_avg,
        period2_avg,
        avg_difference,
        avg_difference_percent,
        verdict,
        direction,
    }
}

/// Holds the two periods being compared and the result derived from them.
///
/// Periods are replaced wholesale; the result is recomputed on every replacement and is
/// `None` until both periods are set.
#[derive(Debug, Clone)]
pub struct ComparisonEngine {
    policy: ComparisonPolicy,
    higher_is_better: bool,
    period1: Option<Period>,
    period2: Option<Period>,
    result: Option<ComparisonResult>,
}

impl ComparisonEngine {
    pub fn new(higher_is_better: bool) -> Self {
        Self::with_policy(ComparisonPolicy::default(), higher_is_better)
    }

    pub fn with_policy(policy: ComparisonPolicy, higher_is_better: bool) -> Self {
        Self {
            policy,
            higher_is_better,
            period1: None,
            period2: None,
            result: None,
        }
    }

    pub fn set_period1(&mut self, period: Period) {
        self.period1 = Some(period);
        self.recompute();
    }

    pub fn set_period2(&mut self, period: Period) {
        self.period2 = Some(period);
        self.recompute();
    }

    /// Replaces both periods with a single recomputation.
    pub fn set_periods(&mut self, period1: Period, period2: Period) {
        self.period1 = Some(period1);
        self.period2 = Some(period2);
        self.recompute();
    }

    pub fn set_higher_is_better(&mut self, higher_is_better: bool) {
        self.higher_is_better = higher_is_better;
        self.recompute();
    }

    pub fn higher_is_better(&self) -> bool {
        self.higher_is_better
    }

    pub fn clear(&mut self) {
        self.period1 = None;
        self.period2 = None;
        self.result = None;
    }

    pub fn period1(&self) -> Option<&Period> {
        self.period1.as_ref()
    }

    pub fn period2(&self) -> Option<&Period> {
        self.period2.as_ref()
    }

    pub fn result(&self) -> Option<&ComparisonResult> {
        self.result.as_ref()
    }

    /// Both periods on a shared relative time axis.
    pub fn overlay(&self) -> Option<Overlay> {
        let (p1, p2) = self.periods()?;
        Some(aligner::overlay(p1, p2))
    }

    /// period2 - period1 trace under the given alignment strategy.
    pub fn difference(&self, strategy: AlignmentStrategy) -> Option<Vec<AlignedPoint>> {
        let (p1, p2) = self.periods()?;
        Some(aligner::difference_with(p1, p2, strategy))
    }

    fn periods(&self) -> Option<(&Period, &Period)> {
        Some((self.period1.as_ref()?, self.period2.as_ref()?))
    }

    fn recompute(&mut self) {
        self.result = self.periods().map(|(p1, p2)| {
            compare_with(&self.policy, p1.summary(), p2.summary(), self.higher_is_better)
        });
    }
}
