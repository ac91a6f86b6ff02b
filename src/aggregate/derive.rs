//! Post-accumulation passes: date ordering and running deltas.
//!
//! Dates are fixed-width ISO strings (`YYYY-MM-DD`, or `YYYY-MM` for period
//! keys), so plain string comparison is chronological.

use crate::aggregate::coerce::round_to;
use crate::domain::{DebtPoint, InterestRatePoint, LiquidityPoint, TrendPoint};

pub trait Dated {
    fn date(&self) -> &str;
}

/// A date plus its primary measure, before any output rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedValue {
    pub date: String,
    pub value: f64,
}

impl DatedValue {
    pub fn new(date: impl Into<String>, value: f64) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }
}

impl Dated for DatedValue {
    fn date(&self) -> &str {
        &self.date
    }
}

impl Dated for TrendPoint {
    fn date(&self) -> &str {
        &self.date
    }
}

impl Dated for LiquidityPoint {
    fn date(&self) -> &str {
        &self.date
    }
}

impl Dated for InterestRatePoint {
    fn date(&self) -> &str {
        &self.date
    }
}

impl Dated for DebtPoint {
    fn date(&self) -> &str {
        &self.date
    }
}

/// Stable ascending sort by date string.
pub fn sort_by_date<T: Dated>(points: &mut [T]) {
    points.sort_by(|a, b| a.date().cmp(b.date()));
}

/// Attach the change from the previous point to each point.
///
/// Expects `points` already in date order. The first point's change is `0.0`.
/// Differences are taken on unrounded values; both measures are rounded to
/// cents afterwards.
pub fn with_running_delta(points: &[DatedValue]) -> Vec<DebtPoint> {
    let mut out = Vec::with_capacity(points.len());
    let mut prev: Option<f64> = None;
    for p in points {
        let change = match prev {
            Some(before) => p.value - before,
            None => 0.0,
        };
        out.push(DebtPoint {
            date: p.date.clone(),
            total_debt: round_to(p.value, 2),
            daily_change: round_to(change, 2),
        });
        prev = Some(p.value);
    }
    out
}
