//! Terminal text for each report.
//!
//! Formatting lives here so output changes stay localized and the
//! aggregation code never deals with presentation.

use crate::domain::{AssetPrice, BondAggregation, DebtPoint, EconomicIndicator, SpreadAnalysis};
use crate::report::Report;

struct Column {
    name: &'static str,
    width: usize,
    right: bool,
}

const fn left(name: &'static str, width: usize) -> Column {
    Column { name, width, right: false }
}

const fn right(name: &'static str, width: usize) -> Column {
    Column { name, width, right: true }
}

pub fn format_report(report: &Report) -> String {
    match report {
        Report::Issuance(agg) => format_issuance(agg),
        Report::Trend(points) => table(
            &[left("month", 10), right("total_issuance", 22)],
            points.iter().map(|p| vec![p.date.clone(), format!("{:.2}", p.total_issuance)]),
        ),
        Report::YieldCurve(points) => table(
            &[left("maturity", 10), right("rate", 8)],
            points.iter().map(|p| vec![p.maturity.clone(), format!("{:.2}", p.rate)]),
        ),
        Report::Spread(spread) => format_spread(spread),
        Report::Liquidity(points) => table(
            &[left("date", 10), right("balance_bn", 14)],
            points.iter().map(|p| vec![p.date.clone(), format!("{:.2}", p.balance_billion)]),
        ),
        Report::DebtCost(points) => table(
            &[left("date", 10), right("avg_rate", 10)],
            points.iter().map(|p| vec![p.date.clone(), format!("{:.4}", p.avg_rate)]),
        ),
        Report::DebtHistory(points) => format_debt_history(points),
        Report::Indicator(ind) => format_indicator(ind),
        Report::Price(price) => format_price(price),
        Report::CacheCleared { removed } => format!("Removed {removed} cached response(s).\n"),
    }
}

fn format_issuance(agg: &BondAggregation) -> String {
    let mut out = format!("Treasury auctions, {}\n\n", agg.period);
    out.push_str(&table(
        &[
            left("security_type", 16),
            right("total_issuance", 22),
            right("avg_yield", 10),
            right("auctions", 8),
        ],
        agg.data.iter().map(|g| {
            vec![
                g.security_type.clone(),
                format!("{:.2}", g.total_issuance),
                format!("{:.4}", g.average_yield),
                g.auction_count.to_string(),
            ]
        }),
    ));
    out
}

fn format_spread(spread: &SpreadAnalysis) -> String {
    let mut out = format!("Spread: {:+.4} ({})\n", spread.spread_value, spread.date);
    if spread.is_inverted {
        out.push_str("Curve is inverted.\n");
    }
    out
}

fn format_debt_history(points: &[DebtPoint]) -> String {
    table(
        &[left("date", 10), right("total_debt", 22), right("daily_change", 18)],
        points.iter().map(|p| {
            vec![
                p.date.clone(),
                format!("{:.2}", p.total_debt),
                format!("{:+.2}", p.daily_change),
            ]
        }),
    )
}

fn format_indicator(ind: &EconomicIndicator) -> String {
    let unit = ind.unit.as_deref().map(|u| format!(" {u}")).unwrap_or_default();
    format!(
        "{} ({})\n{}{unit} as of {}\nSource: {}\n",
        ind.indicator, ind.country, ind.value, ind.date, ind.source
    )
}

fn format_price(price: &AssetPrice) -> String {
    let mut out = format!("{}: {} {}\nSource: {}\n", price.symbol, price.price, price.currency, price.source);
    if let Some(ts) = &price.timestamp {
        out.push_str(&format!("As of: {ts}\n"));
    }
    out
}

fn table<R>(columns: &[Column], rows: R) -> String
where
    R: IntoIterator<Item = Vec<String>>,
{
    let mut out = String::new();
    push_row(&mut out, columns, columns.iter().map(|c| c.name.to_string()));
    push_row(&mut out, columns, columns.iter().map(|c| "-".repeat(c.width)));
    for row in rows {
        push_row(&mut out, columns, row.into_iter());
    }
    out
}

fn push_row(out: &mut String, columns: &[Column], cells: impl Iterator<Item = String>) {
    let line = columns
        .iter()
        .zip(cells)
        .map(|(col, cell)| {
            let cell = truncate(&cell, col.width);
            if col.right {
                format!("{cell:>w$}", w = col.width)
            } else {
                format!("{cell:<w$}", w = col.width)
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
