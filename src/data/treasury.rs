//! Fiscal Data API page fetcher.
//!
//! `GET {base}{endpoint}?filter=..&sort=..&page[size]=..&page[number]=..&format=json`
//!
//! Response shape (fields we read):
//!
//! ```json
//! { "data": [ { "record_date": "2024-06-28", ... } ], "meta": { "total-pages": 12 } }
//! ```

use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;

use crate::aggregate::{Page, PageFetcher, PageRequest};
use crate::data::http;
use crate::domain::RawRecord;
use crate::error::AppError;

pub struct TreasuryClient {
    client: Client,
    base_url: String,
}

impl TreasuryClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn request(&self, request: &PageRequest<'_>) -> RequestBuilder {
        let query = request.query;
        let mut params: Vec<(&str, String)> = Vec::with_capacity(5);
        if let Some(filter) = query.filter.as_ref().filter(|f| !f.is_empty()) {
            params.push(("filter", filter.to_string()));
        }
        if let Some(sort) = &query.sort {
            params.push(("sort", sort.to_string()));
        }
        params.push(("page[size]", query.page_size.to_string()));
        params.push(("page[number]", request.page_number.to_string()));
        params.push(("format", "json".to_string()));

        self.client
            .get(format!("{}{}", self.base_url, query.endpoint.path()))
            .query(&params)
    }
}

impl PageFetcher for TreasuryClient {
    fn fetch_page(&self, request: &PageRequest<'_>) -> Result<Page, AppError> {
        let body: FiscalResponse = http::get_page_json(self.request(request), "Treasury")?;
        Ok(body.into_page(request.page_number))
    }
}

#[derive(Debug, Deserialize)]
struct FiscalResponse {
    #[serde(default)]
    data: Vec<RawRecord>,
    #[serde(default)]
    meta: Option<FiscalMeta>,
}

#[derive(Debug, Deserialize)]
struct FiscalMeta {
    #[serde(rename = "total-pages", default)]
    total_pages: Option<u32>,
}

impl FiscalResponse {
    fn into_page(self, page_number: u32) -> Page {
        Page {
            records: self.data,
            page_number,
            total_pages: self.meta.and_then(|m| m.total_pages),
        }
    }
}
