//! CoinGecko simple price lookup.

use std::collections::HashMap;

use chrono::Utc;
use reqwest::blocking::Client;

use crate::data::http;
use crate::domain::AssetPrice;
use crate::error::AppError;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// `{ "bitcoin": { "usd": 61234.0 } }`
type SimplePrice = HashMap<String, HashMap<String, f64>>;

pub struct CoinGeckoClient {
    client: Client,
}

impl CoinGeckoClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn price(&self, coin_id: &str, currency: &str) -> Result<AssetPrice, AppError> {
        let coin_id = coin_id.to_lowercase();
        let currency = currency.to_lowercase();
        let req = self
            .client
            .get(format!("{BASE_URL}/simple/price"))
            .query(&[("ids", coin_id.as_str()), ("vs_currencies", currency.as_str())]);

        let body: SimplePrice = http::get_json(req, "CoinGecko")?;
        let price = pick_price(&body, &coin_id, &currency)?;

        Ok(AssetPrice {
            symbol: coin_id.to_uppercase(),
            price,
            currency: currency.to_uppercase(),
            source: "CoinGecko".to_string(),
            timestamp: Some(Utc::now().to_rfc3339()),
        })
    }
}

fn pick_price(body: &SimplePrice, coin_id: &str, currency: &str) -> Result<f64, AppError> {
    let quotes = body
        .get(coin_id)
        .ok_or_else(|| AppError::no_data(format!("Coin {coin_id} not found.")))?;
    quotes
        .get(currency)
        .copied()
        .ok_or_else(|| AppError::no_data(format!("No {currency} quote for {coin_id}.")))
}
