//! Accumulators: per-call fold state for each aggregation strategy.
//!
//! An accumulator is created empty, sees every record of every page through
//! `fold`, and is consumed once by `finish`. A record that lacks a required
//! field or fails numeric coercion is rejected (`fold` returns `false`) and
//! leaves the state untouched.

use std::collections::BTreeMap;

use tracing::info;

use crate::aggregate::coerce::{coerce_number, round_to};
use crate::aggregate::derive::{Dated, sort_by_date};
use crate::aggregate::fetch::{PageFetcher, PageQuery};
use crate::aggregate::paging::paginate;
use crate::domain::{BondGroup, RawRecord, TrendPoint};
use crate::error::AppError;

/// Group label used when a record has no usable grouping value.
pub const UNKNOWN_GROUP: &str = "Unknown";

pub trait Accumulator {
    type Output;

    /// Fold one record; `false` means it was skipped.
    fn fold(&mut self, record: &RawRecord) -> bool;

    fn finish(self) -> Self::Output;
}

/// Page through `query`, folding every record into `acc`.
///
/// Fails with `NoData` if the provider returned no records at all. Records that
/// were all skipped still produce `acc.finish()` (typically empty).
pub fn aggregate<A: Accumulator>(
    fetcher: &dyn PageFetcher,
    query: &PageQuery,
    mut acc: A,
) -> Result<A::Output, AppError> {
    let stats = paginate(fetcher, query, |record| acc.fold(record))?;

    if stats.records == 0 {
        return Err(AppError::no_data(format!(
            "No records returned from {}.",
            query.endpoint
        )));
    }

    info!(
        endpoint = %query.endpoint,
        pages = stats.pages,
        records = stats.records,
        skipped = stats.skipped(),
        "aggregation complete"
    );

    Ok(acc.finish())
}

#[derive(Debug, Clone, Copy, Default)]
struct GroupTotals {
    amount: f64,
    rate_sum: f64,
    count: u64,
}

/// Strategy 1: per-group amount total and mean rate.
#[derive(Debug, Clone)]
pub struct GroupedSumAverage {
    key_field: &'static str,
    amount_field: &'static str,
    rate_field: &'static str,
    groups: BTreeMap<String, GroupTotals>,
}

impl GroupedSumAverage {
    pub fn new(key_field: &'static str, amount_field: &'static str, rate_field: &'static str) -> Self {
        Self {
            key_field,
            amount_field,
            rate_field,
            groups: BTreeMap::new(),
        }
    }
}

impl Accumulator for GroupedSumAverage {
    type Output = Vec<BondGroup>;

    fn fold(&mut self, record: &RawRecord) -> bool {
        let (Some(amount), Some(rate)) = (
            coerce_number(record.field(self.amount_field)),
            coerce_number(record.field(self.rate_field)),
        ) else {
            return false;
        };

        let key = record
            .field(self.key_field)
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or(UNKNOWN_GROUP);

        let group = self.groups.entry(key.to_string()).or_default();
        group.amount += amount;
        group.rate_sum += rate;
        group.count += 1;
        true
    }

    /// Groups in key order. Rounding happens here, once.
    fn finish(self) -> Vec<BondGroup> {
        self.groups
            .into_iter()
            .filter(|(_, g)| g.count > 0)
            .map(|(security_type, g)| BondGroup {
                security_type,
                total_issuance: round_to(g.amount, 2),
                average_yield: round_to(g.rate_sum / g.count as f64, 4),
                auction_count: g.count,
            })
            .collect()
    }
}

/// Strategy 2: amount totals keyed by the `YYYY-MM` prefix of a date field.
#[derive(Debug, Clone)]
pub struct PeriodSum {
    date_field: &'static str,
    amount_field: &'static str,
    totals: BTreeMap<String, f64>,
}

impl PeriodSum {
    pub fn new(date_field: &'static str, amount_field: &'static str) -> Self {
        Self {
            date_field,
            amount_field,
            totals: BTreeMap::new(),
        }
    }
}

impl Accumulator for PeriodSum {
    type Output = Vec<TrendPoint>;

    fn fold(&mut self, record: &RawRecord) -> bool {
        let Some(period) = record.field(self.date_field).map(str::trim).and_then(|d| d.get(..7)) else {
            return false;
        };
        let Some(amount) = coerce_number(record.field(self.amount_field)) else {
            return false;
        };
        *self.totals.entry(period.to_string()).or_insert(0.0) += amount;
        true
    }

    fn finish(self) -> Vec<TrendPoint> {
        // BTreeMap iteration is already ascending by period.
        self.totals
            .into_iter()
            .map(|(date, total)| TrendPoint {
                date,
                total_issuance: round_to(total, 2),
            })
            .collect()
    }
}

/// Strategies 4 and 5: one output point per accepted record, date-sorted at the end.
pub struct FlatSeries<P, F> {
    map: F,
    points: Vec<P>,
}

impl<P, F> FlatSeries<P, F>
where
    P: Dated,
    F: FnMut(&RawRecord) -> Option<P>,
{
    pub fn new(map: F) -> Self {
        Self {
            map,
            points: Vec::new(),
        }
    }
}

impl<P, F> Accumulator for FlatSeries<P, F>
where
    P: Dated,
    F: FnMut(&RawRecord) -> Option<P>,
{
    type Output = Vec<P>;

    fn fold(&mut self, record: &RawRecord) -> bool {
        match (self.map)(record) {
            Some(point) => {
                self.points.push(point);
                true
            }
            None => false,
        }
    }

    fn finish(mut self) -> Vec<P> {
        // Pages are requested date-ascending; re-sort in case a provider disagrees.
        sort_by_date(&mut self.points);
        self.points
    }
}

/// Non-empty date field plus a coercible numeric field, or nothing.
pub fn dated_number(record: &RawRecord, date_field: &str, value_field: &str) -> Option<(String, f64)> {
    let date = record.field(date_field).map(str::trim).filter(|d| !d.is_empty())?;
    let value = coerce_number(record.field(value_field))?;
    Some((date.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::derive::DatedValue;
    use crate::aggregate::fake::FakeFetcher;
    use crate::aggregate::fetch::Endpoint;
    use crate::error::ErrorKind;

    fn auction(kind: &str, amt: &str, yld: &str) -> RawRecord {
        RawRecord::from_pairs([("security_type", kind), ("offering_amount", amt), ("high_yield", yld)])
    }

    fn grouped() -> GroupedSumAverage {
        GroupedSumAverage::new("security_type", "offering_amount", "high_yield")
    }

    fn query() -> PageQuery {
        PageQuery::new(Endpoint::AuctionsQuery, 100)
    }

    #[test]
    fn grouped_across_three_pages() {
        let fetcher = FakeFetcher::with_total(
            vec![
                vec![auction("Bill", "100", "5.0")],
                vec![auction("Bill", "200", "5.5")],
                vec![],
            ],
            5,
        );
        let out = aggregate(&fetcher, &query(), grouped()).unwrap();
        assert_eq!(
            out,
            vec![BondGroup {
                security_type: "Bill".to_string(),
                total_issuance: 300.0,
                average_yield: 5.25,
                auction_count: 2,
            }]
        );
        assert_eq!(fetcher.requested_pages(), [1, 2, 3]);
    }

    #[test]
    fn missing_group_field_uses_default_label() {
        let mut acc = grouped();
        let mut no_type = RawRecord::from_pairs([("offering_amount", "10"), ("high_yield", "1.0")]);
        assert!(acc.fold(&no_type));
        no_type.insert("security_type", None);
        assert!(acc.fold(&no_type));
        assert!(acc.fold(&auction("  ", "10", "1.0")));

        let out = acc.finish();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].security_type, UNKNOWN_GROUP);
        assert_eq!(out[0].auction_count, 3);
    }

    #[test]
    fn unparsable_field_is_excluded_from_sum_and_count() {
        let mut acc = grouped();
        assert!(acc.fold(&auction("Note", "1,000", "4.0")));
        assert!(!acc.fold(&auction("Note", "N/A", "4.0")));
        assert!(!acc.fold(&auction("Note", "500", "N/A")));
        assert!(!acc.fold(&RawRecord::from_pairs([("security_type", "Note"), ("offering_amount", "5")])));

        let out = acc.finish();
        assert_eq!(out[0].total_issuance, 1000.0);
        assert_eq!(out[0].average_yield, 4.0);
        assert_eq!(out[0].auction_count, 1);
    }

    #[test]
    fn group_counts_sum_to_accepted_records() {
        let records = vec![
            auction("Bill", "1", "1"),
            auction("Note", "2", "2"),
            auction("Bond", "x", "3"),
            auction("Bill", "4", "4"),
            auction("TIPS", "5", ""),
            auction("Note", "6", "6"),
        ];
        let mut acc = grouped();
        let accepted = records.iter().filter(|r| acc.fold(r)).count();
        let out = acc.finish();
        let total: u64 = out.iter().map(|g| g.auction_count).sum();
        assert_eq!(total as usize, accepted);
        assert_eq!(accepted, 4);
        let types: Vec<&str> = out.iter().map(|g| g.security_type.as_str()).collect();
        assert_eq!(types, ["Bill", "Note"]);
    }

    #[test]
    fn average_is_rounded_once_at_output() {
        let mut acc = grouped();
        acc.fold(&auction("Bill", "1", "0.00006"));
        acc.fold(&auction("Bill", "1", "0.00006"));
        acc.fold(&auction("Bill", "1", "0.00002"));
        let out = acc.finish();
        // 0.00014 / 3 rounds to 0.0; rounding each yield first would give 0.0002 / 3 -> 0.0001.
        assert_eq!(out[0].average_yield, 0.0);
    }

    #[test]
    fn period_sum_groups_by_month() {
        let rec = |d: &str, a: &str| RawRecord::from_pairs([("auction_date", d), ("offering_amount", a)]);
        let fetcher = FakeFetcher::paged(vec![
            vec![rec("2024-02-01", "30"), rec("2024-01-05", "50")],
            vec![rec("2024-01-20", "70"), rec("2024", "999"), rec("2024-03-01", "bad")],
        ]);
        let out = aggregate(&fetcher, &query(), PeriodSum::new("auction_date", "offering_amount")).unwrap();
        assert_eq!(
            out,
            vec![
                TrendPoint { date: "2024-01".to_string(), total_issuance: 120.0 },
                TrendPoint { date: "2024-02".to_string(), total_issuance: 30.0 },
            ]
        );
    }

    #[test]
    fn period_sum_ignores_surrounding_whitespace() {
        let mut acc = PeriodSum::new("auction_date", "offering_amount");
        let rec = |d: &str| RawRecord::from_pairs([("auction_date", d), ("offering_amount", "10")]);
        assert!(acc.fold(&rec(" 2024-01-05")));
        assert!(acc.fold(&rec("2024-01-20 ")));
        assert!(!acc.fold(&rec("  2024 ")));
        assert_eq!(
            acc.finish(),
            vec![TrendPoint { date: "2024-01".to_string(), total_issuance: 20.0 }]
        );
    }

    #[test]
    fn flat_series_sorts_regardless_of_page_order() {
        let rec = |d: &str, v: &str| RawRecord::from_pairs([("record_date", d), ("v", v)]);
        let fetcher = FakeFetcher::paged(vec![
            vec![rec("2024-03-01", "3"), rec("2024-01-01", "1")],
            vec![rec("2023-12-01", "0"), rec("", "9"), rec("2024-02-01", "2")],
        ]);
        let series = FlatSeries::new(|r: &RawRecord| {
            dated_number(r, "record_date", "v").map(|(d, v)| DatedValue::new(d, v))
        });
        let out = aggregate(&fetcher, &query(), series).unwrap();
        let dates: Vec<&str> = out.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, ["2023-12-01", "2024-01-01", "2024-02-01", "2024-03-01"]);
        assert!(out.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn no_records_at_all_is_no_data() {
        let fetcher = FakeFetcher::paged(vec![vec![]]);
        let err = aggregate(&fetcher, &query(), grouped()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoData);
    }

    #[test]
    fn all_records_skipped_is_empty_not_error() {
        let fetcher = FakeFetcher::paged(vec![vec![auction("Bill", "N/A", "N/A")]]);
        let out = aggregate(&fetcher, &query(), grouped()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn fetch_failure_mid_walk_returns_no_partial_result() {
        let fetcher = FakeFetcher::with_total(
            vec![vec![auction("Bill", "100", "5.0")], vec![auction("Bill", "200", "5.5")]],
            2,
        )
        .failing_on(2);
        let err = aggregate(&fetcher, &query(), grouped()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }
}
