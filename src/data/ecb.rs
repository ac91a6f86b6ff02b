//! ECB SDMX REST API: latest USD/EUR reference rate, fetched as CSV.

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;

use crate::aggregate::coerce_number;
use crate::data::http;
use crate::domain::EconomicIndicator;
use crate::error::AppError;

const BASE_URL: &str = "https://data-api.ecb.europa.eu/service";
const FLOW_REF: &str = "EXR";
const SERIES_KEY: &str = "D.USD.EUR.SP00.A";

pub struct EcbClient {
    client: Client,
}

impl EcbClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn usd_eur_reference_rate(&self) -> Result<EconomicIndicator, AppError> {
        let req = self
            .client
            .get(format!("{BASE_URL}/data/{FLOW_REF}/{SERIES_KEY}"))
            .query(&[("lastNObservations", "1")])
            .header(ACCEPT, "text/csv");

        let body = http::get_text(req, "ECB")?;
        let (date, value) = parse_last_observation(&body)?;

        Ok(EconomicIndicator {
            indicator: "ECB Reference Rate (USD/EUR)".to_string(),
            value,
            country: "Euro Area".to_string(),
            date,
            source: "ECB".to_string(),
            unit: Some("USD".to_string()),
        })
    }
}

/// `(TIME_PERIOD, OBS_VALUE)` of the last CSV row.
///
/// Without those headers, falls back to the usual SDMX-CSV layout where they
/// are the third- and second-to-last columns.
fn parse_last_observation(body: &str) -> Result<(String, f64), AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::upstream(format!("Failed to read ECB CSV headers: {e}")))?
        .clone();

    let last = reader
        .records()
        .filter_map(Result::ok)
        .last()
        .ok_or_else(|| AppError::no_data("No data from ECB."))?;

    let position = |name: &str, from_end: usize| {
        headers
            .iter()
            .position(|h| h == name)
            .or_else(|| last.len().checked_sub(from_end))
    };
    let (Some(date_idx), Some(value_idx)) = (position("TIME_PERIOD", 3), position("OBS_VALUE", 2)) else {
        return Err(AppError::upstream("Unexpected ECB CSV layout."));
    };

    let date = last
        .get(date_idx)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::no_data("ECB row has no observation date."))?;
    let value = coerce_number(last.get(value_idx))
        .ok_or_else(|| AppError::no_data("ECB row has no usable observation value."))?;

    Ok((date.to_string(), value))
}
