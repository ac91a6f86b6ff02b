//! Shared domain types.
//!
//! Two families live here:
//!
//! - `RawRecord`: one upstream tabular row, before interpretation
//! - canonical output records: what every command hands to the serving layer
//!
//! Output records are plain serde structs so they can be printed, exported to
//! CSV/JSON, and stored in the response cache without extra mapping.

use std::collections::HashMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One upstream row: field name to string value (`None` for JSON `null`).
///
/// No schema is assumed. Numbers and booleans are kept in their textual form so
/// every field goes through the same coercion path; nested arrays/objects are
/// not meaningful for tabular endpoints and are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "serde_json::Map<String, Value>")]
pub struct RawRecord {
    fields: HashMap<String, Option<String>>,
}

impl RawRecord {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }

    /// Raw value of `name`; `None` when the field is missing or null.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_deref())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        self.fields.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<serde_json::Map<String, Value>> for RawRecord {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        let fields = map
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => Some(s),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    Value::Null | Value::Array(_) | Value::Object(_) => None,
                };
                (k, v)
            })
            .collect();
        Self { fields }
    }
}

/// Points on the published Treasury par yield curve, in curve order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Maturity {
    #[value(name = "1m")]
    M1,
    #[value(name = "3m")]
    M3,
    #[value(name = "1y")]
    Y1,
    #[value(name = "2y")]
    Y2,
    #[value(name = "5y")]
    Y5,
    #[value(name = "10y")]
    Y10,
    #[value(name = "20y")]
    Y20,
    #[value(name = "30y")]
    Y30,
}

impl Maturity {
    pub const ALL: [Maturity; 8] = [
        Maturity::M1,
        Maturity::M3,
        Maturity::Y1,
        Maturity::Y2,
        Maturity::Y5,
        Maturity::Y10,
        Maturity::Y20,
        Maturity::Y30,
    ];

    /// Upstream column holding this maturity's rate.
    pub fn field(self) -> &'static str {
        match self {
            Maturity::M1 => "BC_1MONTH",
            Maturity::M3 => "BC_3MONTH",
            Maturity::Y1 => "BC_1YEAR",
            Maturity::Y2 => "BC_2YEAR",
            Maturity::Y5 => "BC_5YEAR",
            Maturity::Y10 => "BC_10YEAR",
            Maturity::Y20 => "BC_20YEAR",
            Maturity::Y30 => "BC_30YEAR",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Maturity::M1 => "1 Month",
            Maturity::M3 => "3 Month",
            Maturity::Y1 => "1 Year",
            Maturity::Y2 => "2 Year",
            Maturity::Y5 => "5 Year",
            Maturity::Y10 => "10 Year",
            Maturity::Y20 => "20 Year",
            Maturity::Y30 => "30 Year",
        }
    }
}

/// Issuance totals for one security type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondGroup {
    pub security_type: String,
    pub total_issuance: f64,
    pub average_yield: f64,
    pub auction_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondAggregation {
    pub period: String,
    pub data: Vec<BondGroup>,
}

/// Issuance total for one `YYYY-MM` period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub total_issuance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldCurvePoint {
    pub maturity: String,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadAnalysis {
    pub spread_value: f64,
    pub is_inverted: bool,
    pub date: String,
}

/// Treasury General Account closing balance, in billions of USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityPoint {
    pub date: String,
    pub balance_billion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestRatePoint {
    pub date: String,
    pub avg_rate: f64,
}

/// Total public debt outstanding plus the change from the previous record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtPoint {
    pub date: String,
    pub total_debt: f64,
    pub daily_change: f64,
}

/// A single macro data point (debt level, GDP, FRED series, ECB rate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicIndicator {
    pub indicator: String,
    pub value: f64,
    pub country: String,
    pub date: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// A quoted price (FX rate, equity, crypto).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPrice {
    pub symbol: String,
    pub price: f64,
    pub currency: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}
