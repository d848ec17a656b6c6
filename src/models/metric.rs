// Recorded metric kinds and comparison windows

use chrono::{DateTime, Datelike, Duration, Local, LocalResult, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    CpuUsage,
    MemoryUsage,
}

impl MetricKind {
    /// Usage metrics: lower is better.
    pub fn higher_is_better(self) -> bool {
        match self {
            MetricKind::CpuUsage | MetricKind::MemoryUsage => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::CpuUsage => "cpu_usage",
            MetricKind::MemoryUsage => "memory_usage",
        }
    }
}

/// Which two periods to compare. Period 1 is always the older (baseline) one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ComparisonWindow {
    TodayVsYesterday,
    ThisWeekVsLastWeek,
    /// The `secs` immediately before now against the `secs` before that.
    Rolling { secs: u64 },
}

/// Name and epoch-ms bounds of one side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodRange {
    pub name: &'static str,
    pub start: i64,
    pub end: i64,
}

impl ComparisonWindow {
    /// (baseline, current) ranges relative to `now`, in local time.
    pub fn ranges(self, now: DateTime<Local>) -> (PeriodRange, PeriodRange) {
        let now_ms = now.timestamp_millis();
        match self {
            ComparisonWindow::TodayVsYesterday => {
                let today = local_midnight(now);
                let yesterday = today - Duration::days(1);
                (
                    PeriodRange {
                        name: "Yesterday",
                        start: yesterday.timestamp_millis(),
                        end: today.timestamp_millis(),
                    },
                    PeriodRange {
                        name: "Today",
                        start: today.timestamp_millis(),
                        end: now_ms,
                    },
                )
            }
            ComparisonWindow::ThisWeekVsLastWeek => {
                let days_from_monday = i64::from(now.weekday().num_days_from_monday());
                let this_week = local_midnight(now) - Duration::days(days_from_monday);
                let last_week = this_week - Duration::days(7);
                (
                    PeriodRange {
                        name: "Last week",
                        start: last_week.timestamp_millis(),
                        end: this_week.timestamp_millis(),
                    },
                    PeriodRange {
                        name: "This week",
                        start: this_week.timestamp_millis(),
                        end: now_ms,
                    },
                )
            }
            ComparisonWindow::Rolling { secs } => {
                let width = i64::try_from(secs)
                    .unwrap_or(i64::MAX / 2_000)
                    .saturating_mul(1000);
                let split = now_ms.saturating_sub(width);
                (
                    PeriodRange {
                        name: "Previous",
                        start: split.saturating_sub(width),
                        end: split,
                    },
                    PeriodRange {
                        name: "Current",
                        start: split,
                        end: now_ms,
                    },
                )
            }
        }
    }
}

/// Start of `now`'s local day. Falls back to `now - time_of_day` when midnight is ambiguous or skipped.
fn local_midnight(now: DateTime<Local>) -> DateTime<Local> {
    let naive = now.date_naive().and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(t) => t,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => now - (now.time() - NaiveTime::MIN),
    }
}
