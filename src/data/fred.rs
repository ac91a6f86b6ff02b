//! FRED API integration: latest observation of a series.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::aggregate::coerce_number;
use crate::data::http;
use crate::domain::EconomicIndicator;
use crate::error::AppError;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
/// FRED marks missing observations with "."; look a few back for a real value.
const OBS_LIMIT: usize = 10;

pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    pub fn latest(&self, series_id: &str) -> Result<EconomicIndicator, AppError> {
        let limit = OBS_LIMIT.to_string();
        let req = self.client.get(BASE_URL).query(&[
            ("series_id", series_id),
            ("api_key", self.api_key.as_str()),
            ("file_type", "json"),
            ("sort_order", "desc"),
            ("limit", limit.as_str()),
        ]);

        let body: ObservationsResponse = http::get_json(req, "FRED")?;
        let (date, value) = latest_valid(&body.observations)
            .ok_or_else(|| AppError::no_data(format!("No observations returned for series {series_id}.")))?;

        Ok(EconomicIndicator {
            indicator: series_name(series_id).to_string(),
            value,
            country: "United States".to_string(),
            date: date.to_string(),
            source: "FRED".to_string(),
            unit: Some("Index/Percent".to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

/// Friendly names for commonly requested series; anything else keeps its id.
pub fn series_name(series_id: &str) -> &str {
    match series_id {
        "CPIAUCSL" => "CPI (Consumer Price Index)",
        "UNRATE" => "Unemployment Rate",
        "FEDFUNDS" => "Federal Funds Rate",
        "DGS10" => "10-Year Treasury Constant Maturity Rate",
        other => other,
    }
}

/// First observation (newest first) with a numeric value.
fn latest_valid(observations: &[Observation]) -> Option<(&str, f64)> {
    observations
        .iter()
        .find_map(|obs| coerce_number(Some(&obs.value)).map(|v| (obs.date.as_str(), v)))
}
