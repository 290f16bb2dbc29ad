//! Derived statistics over fetched kiosk state.
//!
//! Everything here is a pure function of its inputs so the presenter can
//! recompute it on every read.

use std::fmt;

use chrono::Datelike;
use serde::{Serialize, Serializer};

use crate::models::{IndicatorRecord, Plan};

/// Period-over-period change in whole percent.
///
/// Renders with an explicit `+` for positive changes (`"+10"`), as-is for zero
/// or negative ones (`"0"`, `"-4"`), and as `"unavailable"` when no baseline
/// could be compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PercentChange {
    Change(i64),
    Unavailable,
}

impl PercentChange {
    pub fn value(self) -> Option<i64> {
        match self {
            PercentChange::Change(v) => Some(v),
            PercentChange::Unavailable => None,
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, PercentChange::Change(_))
    }
}

impl fmt::Display for PercentChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentChange::Change(v) if *v > 0 => write!(f, "+{v}"),
            PercentChange::Change(v) => write!(f, "{v}"),
            PercentChange::Unavailable => f.write_str("unavailable"),
        }
    }
}

impl Serialize for PercentChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Compare `current` against `previous` and round to whole percent.
///
/// Either side missing, a zero baseline, or a non-finite result yields
/// [`PercentChange::Unavailable`]. Halves round toward positive infinity.
pub fn percent_change(current: Option<f64>, previous: Option<f64>) -> PercentChange {
    let (Some(current), Some(previous)) = (current, previous) else {
        return PercentChange::Unavailable;
    };
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return PercentChange::Unavailable;
    }

    let ratio = ((current - previous) / previous) * 100.0;
    let rounded = (ratio + 0.5).floor();
    if !rounded.is_finite() {
        return PercentChange::Unavailable;
    }
    PercentChange::Change(rounded as i64)
}

/// Users on a generic trial plus every plan's trialing subscribers.
pub fn total_trial_users(generic_trial_users: u64, plans: &[Plan]) -> u64 {
    generic_trial_users + plans.iter().map(|p| p.trialing_count).sum::<u64>()
}

/// Paying subscribers summed across all plans.
pub fn total_subscribers(plans: &[Plan]) -> u64 {
    plans.iter().map(|p| p.subscriber_count).sum()
}

/// Axis label for one indicator day, `month/day` without zero padding.
pub fn chart_date(record: &IndicatorRecord) -> String {
    let date = record.created_at.date();
    format!("{}/{}", date.month(), date.day())
}

/// Labels for every record in `indicators`, index-aligned with the series.
pub fn chart_dates(indicators: &[IndicatorRecord]) -> Vec<String> {
    indicators.iter().map(chart_date).collect()
}
