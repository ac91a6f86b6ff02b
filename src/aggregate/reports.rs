//! Treasury Fiscal Data reports built on the aggregation core.
//!
//! Each function takes its page source explicitly plus an `as_of` date, so the
//! same call is reproducible under test with a fake fetcher.

use chrono::{Days, NaiveDate};

use crate::aggregate::accumulate::{FlatSeries, GroupedSumAverage, PeriodSum, aggregate, dated_number};
use crate::aggregate::coerce::{coerce_number, round_to};
use crate::aggregate::derive::{DatedValue, with_running_delta};
use crate::aggregate::fetch::{Endpoint, FilterExpr, PageFetcher, PageQuery, SortSpec};
use crate::domain::{
    BondAggregation, DebtPoint, EconomicIndicator, InterestRatePoint, LiquidityPoint, Maturity, RawRecord,
    SpreadAnalysis, TrendPoint, YieldCurvePoint,
};
use crate::error::AppError;

/// Rows per request for paged reports (the provider's practical maximum).
pub const PAGE_SIZE: u32 = 100;

const RECORD_DATE: &str = "record_date";
const AUCTION_DATE: &str = "auction_date";
const SECURITY_TYPE: &str = "security_type";
const OFFERING_AMOUNT: &str = "offering_amount";
const HIGH_YIELD: &str = "high_yield";
const CLOSE_TODAY_BAL: &str = "close_today_bal";
const AVG_INTEREST_RATE: &str = "avg_interest_rate_amt";
const TOTAL_PUBLIC_DEBT: &str = "tot_pub_debt_out_amt";

const TGA_ACCOUNT: &str = "Treasury General Account (TGA)";
const CLOSING_BALANCE: &str = "Closing Balance";

/// Issuance totals and mean high yield per security type, over the last
/// `months_back` months (30-day months).
pub fn bond_issuance_summary(
    fetcher: &dyn PageFetcher,
    months_back: u32,
    as_of: NaiveDate,
) -> Result<BondAggregation, AppError> {
    let start = window_start(as_of, months_back, 30, "months")?;
    let query = PageQuery::new(Endpoint::AuctionsQuery, PAGE_SIZE)
        .filter(FilterExpr::new().since(AUCTION_DATE, start));

    let data = aggregate(
        fetcher,
        &query,
        GroupedSumAverage::new(SECURITY_TYPE, OFFERING_AMOUNT, HIGH_YIELD),
    )?;

    Ok(BondAggregation {
        period: format!("Last {months_back} Months"),
        data,
    })
}

/// Offering amount per auction month, ascending.
pub fn issuance_trend(
    fetcher: &dyn PageFetcher,
    months_back: u32,
    as_of: NaiveDate,
) -> Result<Vec<TrendPoint>, AppError> {
    let start = window_start(as_of, months_back, 30, "months")?;
    let query = PageQuery::new(Endpoint::AuctionsQuery, PAGE_SIZE)
        .filter(FilterExpr::new().since(AUCTION_DATE, start));

    aggregate(fetcher, &query, PeriodSum::new(AUCTION_DATE, OFFERING_AMOUNT))
}

/// Most recent row of `endpoint` (page size 1, newest first).
pub fn latest_record(fetcher: &dyn PageFetcher, endpoint: Endpoint) -> Result<RawRecord, AppError> {
    let query = PageQuery::new(endpoint, 1).sort(SortSpec::desc(RECORD_DATE));
    let page = fetcher.fetch_page(&query.page(1))?;
    page.records
        .into_iter()
        .next()
        .ok_or_else(|| AppError::no_data(format!("No data found at {endpoint}.")))
}

/// Latest par yield curve, in maturity order. Unparsable tenors are left out.
pub fn daily_yield_curve(fetcher: &dyn PageFetcher) -> Result<Vec<YieldCurvePoint>, AppError> {
    let record = latest_record(fetcher, Endpoint::DailyTreasuryYieldCurve)?;
    Ok(Maturity::ALL
        .iter()
        .filter_map(|m| {
            coerce_number(record.field(m.field())).map(|rate| YieldCurvePoint {
                maturity: m.label().to_string(),
                rate,
            })
        })
        .collect())
}

/// `long - short` on the latest curve. Negative means inverted.
pub fn yield_spread(
    fetcher: &dyn PageFetcher,
    long: Maturity,
    short: Maturity,
) -> Result<SpreadAnalysis, AppError> {
    let record = latest_record(fetcher, Endpoint::DailyTreasuryYieldCurve)?;

    let rate = |m: Maturity| {
        coerce_number(record.field(m.field()))
            .ok_or_else(|| AppError::no_data(format!("Missing or invalid {} rate.", m.label())))
    };
    let long_rate = rate(long)?;
    let short_rate = rate(short)?;

    let spread = long_rate - short_rate;
    Ok(SpreadAnalysis {
        spread_value: round_to(spread, 4),
        is_inverted: spread < 0.0,
        date: record.field(RECORD_DATE).unwrap_or("Unknown").to_string(),
    })
}

/// Latest total public debt outstanding.
pub fn total_debt(fetcher: &dyn PageFetcher) -> Result<EconomicIndicator, AppError> {
    let record = latest_record(fetcher, Endpoint::DebtToPenny)?;
    let value = coerce_number(record.field(TOTAL_PUBLIC_DEBT))
        .ok_or_else(|| AppError::no_data("Latest debt record has no usable total."))?;

    Ok(EconomicIndicator {
        indicator: "Total Public Debt Outstanding".to_string(),
        value,
        country: "United States".to_string(),
        date: record.field(RECORD_DATE).unwrap_or("Unknown").to_string(),
        source: "US Treasury".to_string(),
        unit: Some("USD".to_string()),
    })
}

/// Treasury General Account closing balance, billions of USD, by day.
pub fn tga_liquidity(
    fetcher: &dyn PageFetcher,
    days_back: u32,
    as_of: NaiveDate,
) -> Result<Vec<LiquidityPoint>, AppError> {
    let start = window_start(as_of, days_back, 1, "days")?;
    let query = PageQuery::new(Endpoint::DtsOperatingCash, PAGE_SIZE)
        .filter(
            FilterExpr::new()
                .since(RECORD_DATE, start)
                .eq("account_type", TGA_ACCOUNT)
                .eq("item", CLOSING_BALANCE),
        )
        .sort(SortSpec::asc(RECORD_DATE));

    let series = FlatSeries::new(|r: &RawRecord| {
        dated_number(r, RECORD_DATE, CLOSE_TODAY_BAL).map(|(date, balance)| LiquidityPoint {
            date,
            balance_billion: round_to(balance / 1_000_000_000.0, 2),
        })
    });
    aggregate(fetcher, &query, series)
}

/// Average interest rate on outstanding debt over the last `years_back` years.
pub fn debt_cost_trend(
    fetcher: &dyn PageFetcher,
    years_back: u32,
    as_of: NaiveDate,
) -> Result<Vec<InterestRatePoint>, AppError> {
    let start = window_start(as_of, years_back, 365, "years")?;
    let query = PageQuery::new(Endpoint::AvgInterestRates, PAGE_SIZE)
        .filter(FilterExpr::new().since(RECORD_DATE, start))
        .sort(SortSpec::asc(RECORD_DATE));

    let series = FlatSeries::new(|r: &RawRecord| {
        dated_number(r, RECORD_DATE, AVG_INTEREST_RATE).map(|(date, rate)| InterestRatePoint {
            date,
            avg_rate: round_to(rate, 4),
        })
    });
    aggregate(fetcher, &query, series)
}

/// Total public debt by day with the change from the previous record.
pub fn debt_history(
    fetcher: &dyn PageFetcher,
    days_back: u32,
    as_of: NaiveDate,
) -> Result<Vec<DebtPoint>, AppError> {
    let start = window_start(as_of, days_back, 1, "days")?;
    let query = PageQuery::new(Endpoint::DebtToPenny, PAGE_SIZE)
        .filter(FilterExpr::new().since(RECORD_DATE, start))
        .sort(SortSpec::asc(RECORD_DATE));

    let series = FlatSeries::new(|r: &RawRecord| {
        dated_number(r, RECORD_DATE, TOTAL_PUBLIC_DEBT).map(|(date, debt)| DatedValue::new(date, debt))
    });
    let sorted = aggregate(fetcher, &query, series)?;
    Ok(with_running_delta(&sorted))
}

fn window_start(as_of: NaiveDate, count: u32, days_per_unit: u64, unit: &str) -> Result<NaiveDate, AppError> {
    if count == 0 {
        return Err(AppError::config(format!("Look-back window must be at least 1 {unit}.")));
    }
    as_of
        .checked_sub_days(Days::new(u64::from(count) * days_per_unit))
        .ok_or_else(|| AppError::config(format!("Look-back window of {count} {unit} is out of range.")))
}
