//! Command execution shared by every output mode.
//!
//! The pipeline owns the collaborators (Fiscal Data fetcher, HTTP client for
//! single-record providers, response cache) and maps one [`Command`] to one
//! [`Report`]. Printing, plotting, and exporting happen in `app`.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use reqwest::blocking::Client;
use tracing::info;

use crate::aggregate::{self, PageFetcher};
use crate::cache::{CacheKey, ResponseCache};
use crate::cli::Command;
use crate::config::Settings;
use crate::data::{
    CoinGeckoClient, EcbClient, FrankfurterClient, FredClient, TreasuryClient, WorldBankClient, YahooClient, http,
};
use crate::error::AppError;
use crate::report::Report;

const DAY: Duration = Duration::from_secs(86_400);
const HOUR: Duration = Duration::from_secs(3_600);
const MINUTE: Duration = Duration::from_secs(60);

pub struct Pipeline<F> {
    treasury: F,
    client: Client,
    cache: ResponseCache,
    settings: Settings,
    as_of: NaiveDate,
}

impl Pipeline<TreasuryClient> {
    /// Wire the live providers. `cache` is chosen by the caller (flags can
    /// override the environment).
    pub fn from_settings(settings: Settings, cache: ResponseCache) -> Result<Self, AppError> {
        let client = http::build_client(settings.http_timeout)?;
        let treasury = TreasuryClient::new(client.clone(), settings.treasury_base_url.clone());
        Ok(Self::new(treasury, client, cache, settings, Utc::now().date_naive()))
    }
}

impl<F: PageFetcher> Pipeline<F> {
    pub fn new(treasury: F, client: Client, cache: ResponseCache, settings: Settings, as_of: NaiveDate) -> Self {
        Self {
            treasury,
            client,
            cache,
            settings,
            as_of,
        }
    }

    pub fn run(&self, command: &Command) -> Result<Report, AppError> {
        let fetcher: &dyn PageFetcher = &self.treasury;
        let as_of = self.as_of;
        let cache = &self.cache;

        let report = match command {
            Command::Issuance { months } => Report::Issuance(cache.get_or_fetch(
                &CacheKey::new("treasury_issuance").param("months", months),
                DAY,
                || aggregate::bond_issuance_summary(fetcher, *months, as_of),
            )?),
            Command::Trend { months } => Report::Trend(cache.get_or_fetch(
                &CacheKey::new("treasury_trend").param("months", months),
                DAY,
                || aggregate::issuance_trend(fetcher, *months, as_of),
            )?),
            Command::YieldCurve => Report::YieldCurve(cache.get_or_fetch(
                &CacheKey::new("treasury_yield_curve"),
                DAY,
                || aggregate::daily_yield_curve(fetcher),
            )?),
            Command::Spread { long, short } => Report::Spread(cache.get_or_fetch(
                &CacheKey::new("treasury_spread")
                    .param("long", long.label())
                    .param("short", short.label()),
                DAY,
                || aggregate::yield_spread(fetcher, *long, *short),
            )?),
            Command::Tga { days } => Report::Liquidity(cache.get_or_fetch(
                &CacheKey::new("treasury_tga").param("days", days),
                DAY,
                || aggregate::tga_liquidity(fetcher, *days, as_of),
            )?),
            Command::DebtCost { years } => Report::DebtCost(cache.get_or_fetch(
                &CacheKey::new("treasury_debt_cost").param("years", years),
                DAY,
                || aggregate::debt_cost_trend(fetcher, *years, as_of),
            )?),
            Command::DebtHistory { days } => Report::DebtHistory(cache.get_or_fetch(
                &CacheKey::new("treasury_debt_history").param("days", days),
                DAY,
                || aggregate::debt_history(fetcher, *days, as_of),
            )?),
            Command::Debt => Report::Indicator(cache.get_or_fetch(
                &CacheKey::new("treasury_total_debt"),
                DAY,
                || aggregate::total_debt(fetcher),
            )?),
            Command::Fred { series_id } => {
                let fred = FredClient::new(self.client.clone(), self.settings.require_fred_key()?);
                let series_id = series_id.to_uppercase();
                Report::Indicator(cache.get_or_fetch(
                    &CacheKey::new("fred").param("series", &series_id),
                    DAY,
                    || fred.latest(&series_id),
                )?)
            }
            Command::Forex { from, to } => {
                let forex = FrankfurterClient::new(self.client.clone());
                Report::Price(cache.get_or_fetch(
                    &CacheKey::new("forex")
                        .param("from", from.to_uppercase())
                        .param("to", to.to_uppercase()),
                    HOUR,
                    || forex.rate(from, to),
                )?)
            }
            Command::Gdp { country } => {
                let world_bank = WorldBankClient::new(self.client.clone());
                let country = country.to_uppercase();
                Report::Indicator(cache.get_or_fetch(
                    &CacheKey::new("gdp").param("country", &country),
                    DAY,
                    || world_bank.gdp(&country),
                )?)
            }
            Command::Crypto { coin, currency } => {
                let gecko = CoinGeckoClient::new(self.client.clone());
                Report::Price(cache.get_or_fetch(
                    &CacheKey::new("crypto")
                        .param("coin", coin.to_lowercase())
                        .param("currency", currency.to_lowercase()),
                    MINUTE,
                    || gecko.price(coin, currency),
                )?)
            }
            Command::Stock { ticker } => {
                let yahoo = YahooClient::new(self.client.clone());
                Report::Price(cache.get_or_fetch(
                    &CacheKey::new("stock").param("ticker", ticker.to_uppercase()),
                    MINUTE,
                    || yahoo.quote(ticker),
                )?)
            }
            Command::Ecb => {
                let ecb = EcbClient::new(self.client.clone());
                Report::Indicator(cache.get_or_fetch(&CacheKey::new("ecb_usd_eur"), HOUR, || {
                    ecb.usd_eur_reference_rate()
                })?)
            }
            Command::CacheClear => {
                let removed = cache.clear()?;
                info!(removed, "cache cleared");
                Report::CacheCleared { removed }
            }
        };

        Ok(report)
    }
}
