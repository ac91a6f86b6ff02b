//! The page-fetching boundary.
//!
//! The aggregation core never talks HTTP. It builds a typed `PageQuery`, asks a
//! `PageFetcher` for one page at a time, and folds whatever comes back.
//! Filter and sort strings are provider syntax; they are only ever rendered
//! from the typed builders below.

use std::fmt;

use chrono::NaiveDate;

use crate::domain::RawRecord;
use crate::error::AppError;

/// Fiscal Data datasets the core knows how to aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Marketable securities auction results.
    AuctionsQuery,
    /// Daily total public debt outstanding.
    DebtToPenny,
    /// Daily par yield curve rates.
    DailyTreasuryYieldCurve,
    /// Daily Treasury Statement, table 1 (operating cash balance).
    DtsOperatingCash,
    /// Monthly average interest rates on outstanding debt.
    AvgInterestRates,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::AuctionsQuery => "/v1/accounting/od/auctions_query",
            Endpoint::DebtToPenny => "/v2/accounting/od/debt_to_penny",
            Endpoint::DailyTreasuryYieldCurve => "/v2/accounting/od/daily_treasury_yield_curve",
            Endpoint::DtsOperatingCash => "/v1/accounting/dts/dts_table_1",
            Endpoint::AvgInterestRates => "/v2/accounting/od/avg_interest_rates",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
}

impl FilterOp {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Gte => "gte",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Clause {
    field: String,
    op: FilterOp,
    value: String,
}

/// Conjunction of `field:op:value` clauses, rendered comma-joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpr {
    clauses: Vec<Clause>,
}

impl FilterExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, field: &str, value: impl Into<String>) -> Self {
        self.push(field, FilterOp::Eq, value.into())
    }

    pub fn gte(self, field: &str, value: impl Into<String>) -> Self {
        self.push(field, FilterOp::Gte, value.into())
    }

    /// `field:gte:YYYY-MM-DD`
    pub fn since(self, field: &str, date: NaiveDate) -> Self {
        self.gte(field, date.format("%Y-%m-%d").to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    fn push(mut self, field: &str, op: FilterOp, value: String) -> Self {
        self.clauses.push(Clause {
            field: field.to_string(),
            op,
            value,
        });
        self
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}:{}", c.field, c.op.as_str(), c.value)?;
        }
        Ok(())
    }
}

/// Single-field sort; descending renders with a leading `-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

impl SortSpec {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: false,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            f.write_str("-")?;
        }
        f.write_str(&self.field)
    }
}

/// Everything about a paged request except the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    pub endpoint: Endpoint,
    pub filter: Option<FilterExpr>,
    pub sort: Option<SortSpec>,
    pub page_size: u32,
}

impl PageQuery {
    pub fn new(endpoint: Endpoint, page_size: u32) -> Self {
        Self {
            endpoint,
            filter: None,
            sort: None,
            page_size,
        }
    }

    pub fn filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn page(&self, page_number: u32) -> PageRequest<'_> {
        PageRequest {
            query: self,
            page_number,
        }
    }
}

/// One concrete fetch: a query plus its 1-based page number.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub query: &'a PageQuery,
    pub page_number: u32,
}

/// One page of upstream rows plus the pagination cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub records: Vec<RawRecord>,
    pub page_number: u32,
    /// Provider-reported total; `None` when the metadata was missing.
    pub total_pages: Option<u32>,
}

impl Page {
    /// Either exit condition of the paging loop holds for this page.
    ///
    /// Missing `total_pages` counts as zero, so an otherwise non-empty page
    /// without metadata is the last one fetched.
    pub fn is_last(&self) -> bool {
        self.records.is_empty() || self.page_number >= self.total_pages.unwrap_or(0)
    }
}

/// Source of pages for the aggregation core.
///
/// Any error returned here aborts the whole aggregation; implementations
/// should not retry internally unless that is their documented policy.
pub trait PageFetcher {
    fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Page, AppError>;
}

impl<T: PageFetcher + ?Sized> PageFetcher for &T {
    fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Page, AppError> {
        (**self).fetch_page(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_renders_comma_joined_clauses() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let filter = FilterExpr::new()
            .since("record_date", date)
            .eq("account_type", "Treasury General Account (TGA)")
            .eq("item", "Closing Balance");
        assert_eq!(
            filter.to_string(),
            "record_date:gte:2024-03-01,account_type:eq:Treasury General Account (TGA),item:eq:Closing Balance"
        );
        assert!(!filter.is_empty());
        assert!(FilterExpr::new().is_empty());
    }

    #[test]
    fn sort_renders_direction_prefix() {
        assert_eq!(SortSpec::desc("record_date").to_string(), "-record_date");
        assert_eq!(SortSpec::asc("record_date").to_string(), "record_date");
    }

    #[test]
    fn page_is_last_on_empty_or_final_cursor() {
        let rec = RawRecord::from_pairs([("a", "1")]);
        let mid = Page {
            records: vec![rec.clone()],
            page_number: 1,
            total_pages: Some(3),
        };
        assert!(!mid.is_last());

        let final_page = Page {
            records: vec![rec.clone()],
            page_number: 3,
            total_pages: Some(3),
        };
        assert!(final_page.is_last());

        let no_meta = Page {
            records: vec![rec],
            page_number: 1,
            total_pages: None,
        };
        assert!(no_meta.is_last());

        let empty = Page {
            records: Vec::new(),
            page_number: 1,
            total_pages: Some(10),
        };
        assert!(empty.is_last());
    }
}
