// Comparison verdicts and results

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Better,
    Worse,
    Similar,
}

/// Direction of the change between the two averages; `None` when not significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub period1_avg: f64,
    pub period2_avg: f64,
    /// period2 - period1
    pub avg_difference: f64,
    pub avg_difference_percent: f64,
    pub verdict: Verdict,
    pub direction: Direction,
}

impl ComparisonResult {
    /// Short label for log lines, e.g. "worse (+10.0%)".
    pub fn label(&self) -> String {
        let verdict = match self.verdict {
            Verdict::Better => "better",
            Verdict::Worse => "worse",
            Verdict::Similar => "similar",
        };
        let sign = if self.avg_difference >= 0.0 { "+" } else { "" };
        format!("{} ({}{:.1}%)", verdict, sign, self.avg_difference_percent)
    }
}
