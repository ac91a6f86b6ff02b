//! World Bank indicators API: GDP (current US$).

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::data::http;
use crate::domain::EconomicIndicator;
use crate::error::AppError;

const BASE_URL: &str = "https://api.worldbank.org/v2";
const GDP_INDICATOR: &str = "NY.GDP.MKTP.CD";

pub struct WorldBankClient {
    client: Client,
}

impl WorldBankClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Most recent non-empty GDP value for `country_code` (ISO2/ISO3).
    pub fn gdp(&self, country_code: &str) -> Result<EconomicIndicator, AppError> {
        let req = self
            .client
            .get(format!("{BASE_URL}/country/{country_code}/indicator/{GDP_INDICATOR}"))
            .query(&[("format", "json"), ("per_page", "1"), ("mrnev", "1")]);

        let body: Value = http::get_json(req, "World Bank")?;
        parse_latest(body, country_code)
    }
}

#[derive(Debug, Deserialize)]
struct Entry {
    country: Ref,
    date: String,
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Ref {
    value: String,
}

/// The API answers `[paging, [entries...]]`, or `[{"message": ...}]` on bad input.
fn parse_latest(body: Value, country_code: &str) -> Result<EconomicIndicator, AppError> {
    let not_found = || AppError::no_data(format!("No GDP data found for country {country_code}."));

    let entries = match body {
        Value::Array(mut parts) if parts.len() >= 2 => parts.swap_remove(1),
        _ => return Err(not_found()),
    };
    let entries: Vec<Entry> = match entries {
        Value::Null => Vec::new(),
        other => serde_json::from_value(other)
            .map_err(|e| AppError::upstream(format!("Failed to parse World Bank response: {e}")))?,
    };

    let entry = entries.into_iter().find(|e| e.value.is_some()).ok_or_else(not_found)?;
    let value = entry.value.ok_or_else(not_found)?;

    Ok(EconomicIndicator {
        indicator: "GDP".to_string(),
        value,
        country: entry.country.value,
        date: entry.date,
        source: "World Bank".to_string(),
        unit: Some("USD".to_string()),
    })
}
