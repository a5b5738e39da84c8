//! Day partitioning and opening-window selection

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::config::OpeningRangeConfig;
use crate::Bar;

/// All bars of one calendar date, in chronological order
#[derive(Debug, Clone, Copy)]
pub struct Session<'a> {
    pub date: NaiveDate,
    pub bars: &'a [Bar],
}

impl<'a> Session<'a> {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Reference levels taken from the opening window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub high: f64,
    pub low: f64,
}

impl ReferenceRange {
    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// Split a chronologically sorted bar sequence into per-date sessions.
///
/// The input does not have to start at a session boundary; each run of
/// bars sharing a calendar date becomes one session.
pub fn partition_by_session(bars: &[Bar]) -> Vec<Session<'_>> {
    bars.chunk_by(|a, b| a.date() == b.date())
        .map(|chunk| Session {
            date: chunk[0].date(),
            bars: chunk,
        })
        .collect()
}

/// Index range of the bars whose time of day falls inside the opening window.
///
/// Returns an empty range when no bar qualifies. Bars within a session are
/// time-ordered, so qualifying bars are contiguous.
pub fn select_window(bars: &[Bar], config: &OpeningRangeConfig) -> Range<usize> {
    let Some(first) = bars.iter().position(|b| config.contains(b.time())) else {
        return 0..0;
    };
    let last = bars
        .iter()
        .rposition(|b| config.contains(b.time()))
        .unwrap_or(first);

    first..last + 1
}

/// Max high / min low over the given bars, `None` when empty
pub fn reference_range(bars: &[Bar]) -> Option<ReferenceRange> {
    let first = bars.first()?;
    let range = bars.iter().skip(1).fold(
        ReferenceRange {
            high: first.high,
            low: first.low,
        },
        |acc, b| ReferenceRange {
            high: acc.high.max(b.high),
            low: acc.low.min(b.low),
        },
    );
    Some(range)
}
