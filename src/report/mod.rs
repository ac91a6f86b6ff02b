//! Command results and their presentations.
//!
//! [`Report`] is what the pipeline hands back; `format` renders it as text,
//! `io::export` as CSV, and `plot` draws its [`Series`] when it has one.

use serde::Serialize;

use crate::domain::{
    AssetPrice, BondAggregation, DebtPoint, EconomicIndicator, InterestRatePoint, LiquidityPoint, SpreadAnalysis,
    TrendPoint, YieldCurvePoint,
};

pub mod format;

pub use format::format_report;

/// One command's output. Serializes as the bare canonical record(s).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Issuance(BondAggregation),
    Trend(Vec<TrendPoint>),
    YieldCurve(Vec<YieldCurvePoint>),
    Spread(SpreadAnalysis),
    Liquidity(Vec<LiquidityPoint>),
    DebtCost(Vec<InterestRatePoint>),
    DebtHistory(Vec<DebtPoint>),
    Indicator(EconomicIndicator),
    Price(AssetPrice),
    CacheCleared { removed: usize },
}

/// Labelled values in display order, for plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub title: &'static str,
    pub unit: &'static str,
    pub points: Vec<(String, f64)>,
}

impl Report {
    pub fn series(&self) -> Option<Series> {
        let (title, unit, points): (_, _, Vec<(String, f64)>) = match self {
            Report::Trend(points) => (
                "Monthly issuance",
                " USD",
                points.iter().map(|p| (p.date.clone(), p.total_issuance)).collect(),
            ),
            Report::YieldCurve(points) => (
                "Par yield curve",
                "%",
                points.iter().map(|p| (p.maturity.clone(), p.rate)).collect(),
            ),
            Report::Liquidity(points) => (
                "TGA closing balance",
                "bn",
                points.iter().map(|p| (p.date.clone(), p.balance_billion)).collect(),
            ),
            Report::DebtCost(points) => (
                "Average interest rate",
                "%",
                points.iter().map(|p| (p.date.clone(), p.avg_rate)).collect(),
            ),
            Report::DebtHistory(points) => (
                "Total public debt",
                " USD",
                points.iter().map(|p| (p.date.clone(), p.total_debt)).collect(),
            ),
            _ => return None,
        };
        Some(Series { title, unit, points })
    }
}
