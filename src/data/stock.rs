//! Yahoo Finance chart endpoint, used for last equity price.

use chrono::Utc;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::http;
use crate::domain::AssetPrice;
use crate::error::AppError;

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

pub struct YahooClient {
    client: Client,
}

impl YahooClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn quote(&self, ticker: &str) -> Result<AssetPrice, AppError> {
        let ticker = ticker.to_uppercase();
        let req = self
            .client
            .get(format!("{BASE_URL}/{ticker}"))
            .query(&[("range", "1d"), ("interval", "1d")]);

        let body: ChartResponse = http::get_json(req, "Yahoo Finance")?;
        let meta = body.into_meta(&ticker)?;

        Ok(AssetPrice {
            symbol: ticker,
            price: meta.price,
            currency: meta.currency,
            source: "Yahoo Finance".to_string(),
            timestamp: Some(Utc::now().to_rfc3339()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    price: f64,
    #[serde(default = "default_currency")]
    currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl ChartResponse {
    fn into_meta(self, ticker: &str) -> Result<ChartMeta, AppError> {
        self.chart
            .result
            .and_then(|r| r.into_iter().next())
            .map(|r| r.meta)
            .ok_or_else(|| AppError::no_data(format!("No quote found for {ticker}.")))
    }
}
