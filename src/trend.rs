//! Period-over-period comparison.
//!
//! Drink metrics compare two adjacent 7-day calendar windows. Mood compares
//! the latest 7 entries with the 7 before them, regardless of how many days
//! those entries span. The two conventions differ and are kept that way.

use crate::aggregate::{average_mood, totals_between, DrinkTotals};
use crate::models::{DrinkLogRecord, MoodRecord};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

pub const COMPARISON_WINDOW_DAYS: i64 = 7;
pub const MOOD_WINDOW_ENTRIES: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

/// `percent_change` is always non-negative; the sign lives in `direction`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendResult {
    pub direction: TrendDirection,
    pub percent_change: f64,
}

impl TrendResult {
    const STABLE: Self = Self {
        direction: TrendDirection::Stable,
        percent_change: 0.0,
    };

    pub fn assess(&self, polarity: Polarity) -> Assessment {
        match (self.direction, polarity) {
            (TrendDirection::Stable, _) => Assessment::Neutral,
            (TrendDirection::Up, Polarity::HigherIsBetter)
            | (TrendDirection::Down, Polarity::LowerIsBetter) => Assessment::Favorable,
            _ => Assessment::Unfavorable,
        }
    }
}

/// Which way a metric should move to be shown as an improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    LowerIsBetter,
    HigherIsBetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Assessment {
    Favorable,
    Unfavorable,
    Neutral,
}

pub fn trend(current: f64, previous: f64) -> TrendResult {
    if previous == 0.0 && current == 0.0 {
        return TrendResult::STABLE;
    }
    if previous == 0.0 {
        // No base to divide by; report a symbolic 100% rise.
        return TrendResult {
            direction: TrendDirection::Up,
            percent_change: 100.0,
        };
    }
    if current == previous {
        return TrendResult::STABLE;
    }

    TrendResult {
        direction: if current > previous {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        },
        percent_change: ((current - previous) / previous * 100.0).abs(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowPair<T> {
    pub current: T,
    pub previous: T,
}

/// Totals for `[now - 7d, now)` and `[now - 14d, now - 7d)`.
pub fn drink_windows(records: &[DrinkLogRecord], now: DateTime<Utc>) -> WindowPair<DrinkTotals> {
    let window = Duration::days(COMPARISON_WINDOW_DAYS);
    let current_start = now - window;
    let previous_start = current_start - window;

    WindowPair {
        current: totals_between(records, current_start, now),
        previous: totals_between(records, previous_start, current_start),
    }
}

/// Average mood of the newest 7 entries and of the 7 entries before those.
/// An empty window averages to 0.
pub fn mood_windows(moods: &[MoodRecord]) -> WindowPair<f64> {
    let mut newest_first: Vec<&MoodRecord> = moods.iter().collect();
    newest_first.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let current = newest_first.iter().take(MOOD_WINDOW_ENTRIES).copied();
    let previous = newest_first
        .iter()
        .skip(MOOD_WINDOW_ENTRIES)
        .take(MOOD_WINDOW_ENTRIES)
        .copied();

    WindowPair {
        current: average_mood(current).unwrap_or(0.0),
        previous: average_mood(previous).unwrap_or(0.0),
    }
}
