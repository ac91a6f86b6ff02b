//! Frankfurter (ECB reference rates) currency conversion.

use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::data::http;
use crate::domain::AssetPrice;
use crate::error::AppError;

const BASE_URL: &str = "https://api.frankfurter.app";

pub struct FrankfurterClient {
    client: Client,
}

impl FrankfurterClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn rate(&self, from: &str, to: &str) -> Result<AssetPrice, AppError> {
        let from = from.to_uppercase();
        let to = to.to_uppercase();
        let req = self
            .client
            .get(format!("{BASE_URL}/latest"))
            .query(&[("from", from.as_str()), ("to", to.as_str())]);

        let body: LatestResponse = http::get_json(req, "Frankfurter")?;
        body.into_price(&from, &to)
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    date: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

impl LatestResponse {
    fn into_price(self, from: &str, to: &str) -> Result<AssetPrice, AppError> {
        let price = *self
            .rates
            .get(to)
            .ok_or_else(|| AppError::no_data(format!("No {from}/{to} rate published.")))?;

        Ok(AssetPrice {
            symbol: format!("{from}/{to}"),
            price,
            currency: to.to_string(),
            source: "Frankfurter".to_string(),
            // Frankfurter publishes a date, not a timestamp.
            timestamp: Some(self.date),
        })
    }
}
