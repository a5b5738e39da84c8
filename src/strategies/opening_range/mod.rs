//! Opening Range Breakout
//!
//! Per-day scan: take the high/low of the opening window (09:15-09:30 by
//! default), record the first breakout above or breakdown below that range,
//! and grade the bar that follows it.

pub mod classifier;
pub mod config;
pub mod session;

pub use classifier::{
    classify, classify_many, classify_session, BreakoutEvent, Direction, OpeningRangeReport,
    Outcome, SessionClassification, TradeResult,
};
pub use config::{parse_time_of_day, OpeningRangeConfig};
pub use session::{partition_by_session, reference_range, select_window, ReferenceRange, Session};
