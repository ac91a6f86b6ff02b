//! Command-line parsing for `finagg`.
//!
//! Parsing and dispatch stay apart from the aggregation code; `app` turns a
//! parsed [`Cli`] into calls on the pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Maturity;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "finagg", version, about = "US Treasury Fiscal Data aggregation and market data lookups")]
pub struct Cli {
    #[command(flatten)]
    pub output: OutputArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Print the result as pretty JSON instead of a table.
    #[arg(long, global = true)]
    pub json: bool,

    /// Also write the result rows to this CSV file.
    #[arg(long, global = true, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Draw an ASCII plot under series outputs.
    #[arg(long, global = true)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, global = true, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, global = true, default_value_t = 16)]
    pub height: usize,

    /// Skip the response cache for this run.
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Override the cache directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// CLI subcommands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Auction totals and average high yield per security type.
    Issuance {
        #[arg(long, default_value_t = 6)]
        months: u32,
    },
    /// Monthly auction issuance totals.
    Trend {
        #[arg(long, default_value_t = 12)]
        months: u32,
    },
    /// Latest daily par yield curve.
    YieldCurve,
    /// Spread between two points of the latest yield curve.
    Spread {
        #[arg(long, value_enum, default_value_t = Maturity::Y10)]
        long: Maturity,
        #[arg(long, value_enum, default_value_t = Maturity::Y2)]
        short: Maturity,
    },
    /// Treasury General Account closing balance (USD billions).
    Tga {
        #[arg(long, default_value_t = 90)]
        days: u32,
    },
    /// Average interest rate on outstanding marketable debt.
    DebtCost {
        #[arg(long, default_value_t = 5)]
        years: u32,
    },
    /// Total public debt with day-over-day change.
    DebtHistory {
        #[arg(long, default_value_t = 365)]
        days: u32,
    },
    /// Latest total public debt outstanding.
    Debt,
    /// Latest observation of a FRED series (needs FRED_API_KEY).
    Fred {
        #[arg(value_name = "SERIES_ID")]
        series_id: String,
    },
    /// Latest exchange rate (Frankfurter).
    Forex {
        #[arg(value_name = "FROM")]
        from: String,
        #[arg(long, default_value = "USD")]
        to: String,
    },
    /// Most recent GDP in current USD (World Bank).
    Gdp {
        /// ISO country code, e.g. US or DEU.
        #[arg(value_name = "COUNTRY")]
        country: String,
    },
    /// Spot crypto price (CoinGecko coin id, e.g. bitcoin).
    Crypto {
        #[arg(value_name = "COIN")]
        coin: String,
        #[arg(long, default_value = "usd")]
        currency: String,
    },
    /// Last equity price (Yahoo Finance).
    Stock {
        #[arg(value_name = "TICKER")]
        ticker: String,
    },
    /// Latest ECB USD/EUR reference rate.
    Ecb,
    /// Delete every cached response.
    CacheClear,
}
