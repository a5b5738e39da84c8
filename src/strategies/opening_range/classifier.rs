//! Opening Range Breakout Classifier
//!
//! Reference: high/low of the opening window of each day
//! Event: first bar from the last window bar onward whose high exceeds the
//!        reference high (breakout) or whose low undercuts the reference low
//!        (breakdown). The high check runs first, so a bar that does both is
//!        a breakout.
//! Outcome: the next bar of the same day closes back inside the range
//!          (failure) or not (success).

use chrono::{NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::OpeningRangeConfig;
use super::session::{partition_by_session, reference_range, select_window, ReferenceRange, Session};
use crate::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Breakout,
    Breakdown,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Breakout => write!(f, "breakout"),
            Direction::Breakdown => write!(f, "breakdown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeResult {
    Success,
    Failure,
}

/// A detected breakout or breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutEvent {
    pub session_date: NaiveDate,
    pub trigger_time: NaiveDateTime,
    pub direction: Direction,
    pub reference: ReferenceRange,
}

/// Classification of the bar right after an event's trigger bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub session_date: NaiveDate,
    pub outcome_time: NaiveDateTime,
    pub direction: Direction,
    pub result: TradeResult,
}

/// What a single session produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionClassification {
    /// `None` when the opening window had no bars
    pub reference: Option<ReferenceRange>,
    pub event: Option<BreakoutEvent>,
    pub outcome: Option<Outcome>,
}

/// Aggregate over all sessions, in session order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningRangeReport {
    pub breakouts: Vec<BreakoutEvent>,
    pub breakdowns: Vec<BreakoutEvent>,
    pub successful_trades: Vec<Outcome>,
    pub failed_trades: Vec<Outcome>,
    /// Distinct sessions seen, including skipped ones
    pub total_days: usize,
}

impl OpeningRangeReport {
    pub fn total_breakouts(&self) -> usize {
        self.breakouts.len()
    }

    pub fn total_breakdowns(&self) -> usize {
        self.breakdowns.len()
    }

    pub fn total_successful(&self) -> usize {
        self.successful_trades.len()
    }

    pub fn total_failed(&self) -> usize {
        self.failed_trades.len()
    }

    /// Successful outcomes as a percentage of all outcomes
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.total_successful() + self.total_failed();
        if total == 0 {
            return None;
        }
        Some(self.total_successful() as f64 / total as f64 * 100.0)
    }

    fn push(&mut self, classification: SessionClassification) {
        if let Some(event) = classification.event {
            match event.direction {
                Direction::Breakout => self.breakouts.push(event),
                Direction::Breakdown => self.breakdowns.push(event),
            }
        }
        if let Some(outcome) = classification.outcome {
            match outcome.result {
                TradeResult::Success => self.successful_trades.push(outcome),
                TradeResult::Failure => self.failed_trades.push(outcome),
            }
        }
    }
}

/// Classify one session
pub fn classify_session(session: &Session<'_>, config: &OpeningRangeConfig) -> SessionClassification {
    let window = select_window(session.bars, config);
    let Some(reference) = reference_range(&session.bars[window.clone()]) else {
        return SessionClassification::default();
    };

    // Scan starts at the last window bar, which is checked again
    let scan = &session.bars[window.end - 1..];

    let mut classification = SessionClassification {
        reference: Some(reference),
        ..Default::default()
    };

    for (i, bar) in scan.iter().enumerate() {
        let direction = if bar.high > reference.high {
            Direction::Breakout
        } else if bar.low < reference.low {
            Direction::Breakdown
        } else {
            continue;
        };

        classification.event = Some(BreakoutEvent {
            session_date: session.date,
            trigger_time: bar.timestamp,
            direction,
            reference,
        });

        classification.outcome = scan.get(i + 1).map(|next| {
            let failed = match direction {
                Direction::Breakout => next.close < reference.high,
                Direction::Breakdown => next.close > reference.low,
            };
            Outcome {
                session_date: session.date,
                outcome_time: next.timestamp,
                direction,
                result: if failed {
                    TradeResult::Failure
                } else {
                    TradeResult::Success
                },
            }
        });
        break;
    }

    classification
}

/// Run the opening-range scan over a chronologically sorted bar sequence
pub fn classify(bars: &[Bar], config: &OpeningRangeConfig) -> OpeningRangeReport {
    let sessions = partition_by_session(bars);
    let mut report = OpeningRangeReport {
        total_days: sessions.len(),
        ..Default::default()
    };

    for session in &sessions {
        let classification = classify_session(session, config);
        if classification.reference.is_none() {
            tracing::debug!(date = %session.date, "No bars in opening window, skipping day");
        }
        report.push(classification);
    }

    report
}

/// Classify independent bar sequences in parallel, one report per input
pub fn classify_many<S>(inputs: &[S], config: &OpeningRangeConfig) -> Vec<OpeningRangeReport>
where
    S: AsRef<[Bar]> + Sync,
{
    inputs
        .par_iter()
        .map(|bars| classify(bars.as_ref(), config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: &str, high: f64, low: f64, close: f64) -> Bar {
        let timestamp = NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap();
        Bar::new_unchecked(timestamp, close, high, low, close, 0.0)
    }

    /// Window bars giving high_ref = 100, low_ref = 95
    fn opening(date: &str) -> Vec<Bar> {
        vec![
            bar(&format!("{} 09:15", date), 100.0, 96.0, 98.0),
            bar(&format!("{} 09:20", date), 99.0, 95.0, 97.0),
            bar(&format!("{} 09:25", date), 98.5, 96.5, 97.5),
            bar(&format!("{} 09:30", date), 99.5, 96.0, 98.0),
        ]
    }

    #[test]
    fn test_breakout_then_failure() {
        let mut bars = opening("2024-09-16");
        bars.push(bar("2024-09-16 09:35", 99.0, 96.0, 98.0));
        bars.push(bar("2024-09-16 09:40", 101.0, 98.0, 100.5));
        bars.push(bar("2024-09-16 09:45", 100.5, 98.5, 99.0));

        let report = classify(&bars, &OpeningRangeConfig::default());
        assert_eq!(report.total_days, 1);
        assert_eq!(report.total_breakouts(), 1);
        assert_eq!(report.total_breakdowns(), 0);
        assert_eq!(report.breakouts[0].trigger_time, bars[5].timestamp);
        assert_eq!(report.breakouts[0].reference.high, 100.0);
        assert_eq!(report.breakouts[0].reference.low, 95.0);
        assert_eq!(report.total_failed(), 1);
        assert_eq!(report.failed_trades[0].outcome_time, bars[6].timestamp);
        assert_eq!(report.failed_trades[0].direction, Direction::Breakout);
    }

    #[test]
    fn test_breakdown_then_failure() {
        let mut bars = opening("2024-09-16");
        bars.push(bar("2024-09-16 09:35", 99.0, 94.0, 95.5));
        bars.push(bar("2024-09-16 09:40", 97.0, 95.0, 96.0));

        let report = classify(&bars, &OpeningRangeConfig::default());
        assert_eq!(report.total_breakdowns(), 1);
        assert_eq!(report.total_breakouts(), 0);
        assert_eq!(report.total_failed(), 1);
        assert_eq!(report.total_successful(), 0);
    }

    #[test]
    fn test_breakdown_then_success() {
        let mut bars = opening("2024-09-16");
        bars.push(bar("2024-09-16 09:35", 99.0, 94.0, 95.5));
        bars.push(bar("2024-09-16 09:40", 95.0, 93.0, 94.0));

        let report = classify(&bars, &OpeningRangeConfig::default());
        assert_eq!(report.total_successful(), 1);
        assert_eq!(report.successful_trades[0].direction, Direction::Breakdown);
    }

    #[test]
    fn test_no_window_bars_skips_day() {
        let bars = vec![
            bar("2024-09-16 10:00", 100.0, 95.0, 97.0),
            bar("2024-09-16 10:05", 110.0, 90.0, 97.0),
        ];
        let report = classify(&bars, &OpeningRangeConfig::default());
        assert_eq!(report.total_days, 1);
        assert!(report.breakouts.is_empty());
        assert!(report.breakdowns.is_empty());
        assert!(report.successful_trades.is_empty());
        assert!(report.failed_trades.is_empty());
    }

    #[test]
    fn test_trigger_on_last_bar_has_no_outcome() {
        let mut bars = opening("2024-09-16");
        bars.push(bar("2024-09-16 09:35", 102.0, 97.0, 101.0));
        // Next bar belongs to the following day and must not be used
        bars.push(bar("2024-09-17 09:15", 90.0, 80.0, 85.0));

        let report = classify(&bars, &OpeningRangeConfig::default());
        assert_eq!(report.total_days, 2);
        assert_eq!(report.total_breakouts(), 1);
        assert!(report.successful_trades.is_empty());
        assert!(report.failed_trades.is_empty());
    }

    #[test]
    fn test_outside_bar_counts_as_breakout_only() {
        let mut bars = opening("2024-09-16");
        bars.push(bar("2024-09-16 09:35", 101.0, 94.0, 100.0));
        bars.push(bar("2024-09-16 09:40", 101.0, 99.0, 100.5));

        let report = classify(&bars, &OpeningRangeConfig::default());
        assert_eq!(report.total_breakouts(), 1);
        assert_eq!(report.total_breakdowns(), 0);
        assert_eq!(report.total_successful(), 1);
    }

    #[test]
    fn test_close_equal_to_reference_is_success() {
        let mut bars = opening("2024-09-16");
        bars.push(bar("2024-09-16 09:35", 101.0, 98.0, 100.5));
        bars.push(bar("2024-09-16 09:40", 100.5, 99.0, 100.0));

        let report = classify(&bars, &OpeningRangeConfig::default());
        assert_eq!(report.total_successful(), 1);
        assert_eq!(report.total_failed(), 0);

        let mut bars = opening("2024-09-17");
        bars.push(bar("2024-09-17 09:35", 97.0, 94.0, 94.5));
        bars.push(bar("2024-09-17 09:40", 96.0, 94.0, 95.0));

        let report = classify(&bars, &OpeningRangeConfig::default());
        assert_eq!(report.total_breakdowns(), 1);
        assert_eq!(report.total_successful(), 1);
    }

    #[test]
    fn test_only_first_excursion_counts() {
        let mut bars = opening("2024-09-16");
        bars.push(bar("2024-09-16 09:35", 99.0, 94.0, 94.5));
        bars.push(bar("2024-09-16 09:40", 96.0, 93.0, 94.0));
        bars.push(bar("2024-09-16 09:45", 105.0, 94.0, 104.0));

        let report = classify(&bars, &OpeningRangeConfig::default());
        assert_eq!(report.total_breakdowns(), 1);
        assert_eq!(report.total_breakouts(), 0);
        assert_eq!(report.total_successful() + report.total_failed(), 1);
    }

    #[test]
    fn test_last_window_bar_is_rescanned() {
        // The window ends at 09:20 here, so the 09:20 bar opens the scan
        // region. It cannot exceed its own range, and the next bar triggers.
        let config = OpeningRangeConfig::new(
            chrono::NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            chrono::NaiveTime::from_hms_opt(9, 20, 0).unwrap(),
        )
        .unwrap();
        let bars = vec![
            bar("2024-09-16 09:15", 100.0, 95.0, 97.0),
            bar("2024-09-16 09:20", 99.0, 96.0, 98.0),
            bar("2024-09-16 09:25", 100.5, 97.0, 100.2),
            bar("2024-09-16 09:30", 101.0, 99.0, 99.5),
        ];
        let day = partition_by_session(&bars);
        let result = classify_session(&day[0], &config);
        let event = result.event.unwrap();
        assert_eq!(event.trigger_time, bars[2].timestamp);
        let outcome = result.outcome.unwrap();
        assert_eq!(outcome.outcome_time, bars[3].timestamp);
        assert_eq!(outcome.result, TradeResult::Failure);
    }

    #[test]
    fn test_multi_day_order_and_counts() {
        let mut bars = opening("2024-09-16");
        bars.push(bar("2024-09-16 09:35", 101.0, 98.0, 100.5));
        bars.push(bar("2024-09-16 09:40", 102.0, 100.0, 101.0));
        bars.push(bar("2024-09-17 10:00", 100.0, 95.0, 97.0));
        bars.extend(opening("2024-09-18"));
        bars.push(bar("2024-09-18 09:35", 97.0, 94.0, 94.5));
        bars.push(bar("2024-09-18 09:40", 97.0, 95.0, 96.0));

        let report = classify(&bars, &OpeningRangeConfig::default());
        assert_eq!(report.total_days, 3);
        assert_eq!(report.total_breakouts(), 1);
        assert_eq!(report.total_breakdowns(), 1);
        assert_eq!(report.total_successful(), 1);
        assert_eq!(report.total_failed(), 1);
        assert_eq!(report.success_rate(), Some(50.0));
        assert!(report.breakouts[0].session_date < report.breakdowns[0].session_date);
    }

    #[test]
    fn test_empty_input() {
        let report = classify(&[], &OpeningRangeConfig::default());
        assert_eq!(report, OpeningRangeReport::default());
        assert_eq!(report.success_rate(), None);
    }

    #[test]
    fn test_classify_many_matches_sequential() {
        let mut a = opening("2024-09-16");
        a.push(bar("2024-09-16 09:35", 101.0, 98.0, 100.5));
        a.push(bar("2024-09-16 09:40", 102.0, 100.0, 101.0));
        let b = opening("2024-09-17");

        let inputs = vec![a.clone(), b.clone()];
        let config = OpeningRangeConfig::default();
        let reports = classify_many(&inputs, &config);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0], classify(&a, &config));
        assert_eq!(reports[1], classify(&b, &config));
    }
}
