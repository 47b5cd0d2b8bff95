//! Stock lookups against Yahoo Finance
//!
//! Each lookup pulls a fresh attribute snapshot for the symbol and returns a
//! single field from it. Nothing is cached between calls.

use reqwest::Client;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::form_urlencoded;

use crate::core::config::MarketConfig;
use crate::core::{Result, StewardError};

/// quoteSummary modules that together cover every [`StockField`]
const MODULES: &str = "assetProfile,summaryDetail,financialData";

/// Flattened field name → value map for one symbol
pub type Snapshot = Map<String, Value>;

/// Fields the agent may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockField {
    Industry,
    Sector,
    LongBusinessSummary,
    FullTimeEmployees,
    CompanyOfficers,
    BoardRisk,
    CompensationRisk,
    PriceHint,
    PreviousClose,
    Open,
    DayLow,
    DayHigh,
    RegularMarketDayLow,
    RegularMarketDayHigh,
    CurrentPrice,
}

impl StockField {
    pub const ALL: [StockField; 15] = [
        StockField::Industry,
        StockField::Sector,
        StockField::LongBusinessSummary,
        StockField::FullTimeEmployees,
        StockField::CompanyOfficers,
        StockField::BoardRisk,
        StockField::CompensationRisk,
        StockField::PriceHint,
        StockField::PreviousClose,
        StockField::Open,
        StockField::DayLow,
        StockField::DayHigh,
        StockField::RegularMarketDayLow,
        StockField::RegularMarketDayHigh,
        StockField::CurrentPrice,
    ];

    /// Key in the provider snapshot, also the name the model uses
    pub fn key(&self) -> &'static str {
        match self {
            StockField::Industry => "industry",
            StockField::Sector => "sector",
            StockField::LongBusinessSummary => "longBusinessSummary",
            StockField::FullTimeEmployees => "fullTimeEmployees",
            StockField::CompanyOfficers => "companyOfficers",
            StockField::BoardRisk => "boardRisk",
            StockField::CompensationRisk => "compensationRisk",
            StockField::PriceHint => "priceHint",
            StockField::PreviousClose => "previousClose",
            StockField::Open => "open",
            StockField::DayLow => "dayLow",
            StockField::DayHigh => "dayHigh",
            StockField::RegularMarketDayLow => "regularMarketDayLow",
            StockField::RegularMarketDayHigh => "regularMarketDayHigh",
            StockField::CurrentPrice => "currentPrice",
        }
    }

    /// Every valid key, comma separated
    pub fn vocabulary() -> String {
        Self::ALL
            .iter()
            .map(|f| f.key())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for StockField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StockField {
    type Err = StewardError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.key() == name)
            .ok_or_else(|| StewardError::UnknownStockField(name.to_string(), Self::vocabulary()))
    }
}

/// Client for the market-data provider
pub struct StockInfoClient {
    client: Client,
    config: MarketConfig,
}

impl StockInfoClient {
    /// Create a client; the cookie jar carries Yahoo's session cookie
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0")
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Current value of one field for `symbol`
    pub async fn get_field(&self, symbol: &str, field: StockField) -> Result<Value> {
        let symbol = normalize_symbol(symbol)?;
        let mut snapshot = self.snapshot(&symbol).await?;

        snapshot
            .remove(field.key())
            .ok_or_else(|| StewardError::StockFieldMissing {
                symbol,
                field: field.key().to_string(),
            })
    }

    /// Full attribute snapshot for `symbol`
    pub async fn snapshot(&self, symbol: &str) -> Result<Snapshot> {
        let crumb = self.crumb().await?;
        let base = self.config.base_url.trim_end_matches('/');
        let encoded: String = form_urlencoded::byte_serialize(symbol.as_bytes()).collect();

        let response = self
            .client
            .get(format!("{base}/v10/finance/quoteSummary/{encoded}"))
            .query(&[("modules", MODULES), ("crumb", crumb.as_str())])
            .send()
            .await
            .map_err(|e| StewardError::market(format!("quote request failed: {}", e)))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        let summary = &body["quoteSummary"];

        if let Some(first) = summary["result"].as_array().and_then(|r| r.first()) {
            return Ok(flatten_modules(first));
        }

        let description = summary["error"]["description"].as_str().unwrap_or_default();
        if status.as_u16() == 404 || description.to_lowercase().contains("not found") {
            return Err(StewardError::SymbolNotFound(symbol.to_string()));
        }

        Err(StewardError::market(format!(
            "unexpected quote response ({}): {}",
            status, description
        )))
    }

    /// Yahoo only answers quoteSummary for a session cookie plus crumb
    async fn crumb(&self) -> Result<String> {
        if let Err(e) = self.client.get(&self.config.cookie_url).send().await {
            tracing::debug!("cookie request failed: {}", e);
        }

        let base = self.config.base_url.trim_end_matches('/');
        let response = self
            .client
            .get(format!("{base}/v1/test/getcrumb"))
            .send()
            .await
            .map_err(|e| StewardError::market(format!("crumb request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(StewardError::market(format!(
                "crumb request returned {}",
                response.status()
            )));
        }

        let crumb = response.text().await?.trim().to_string();
        if crumb.is_empty() {
            return Err(StewardError::market("empty crumb"));
        }
        Ok(crumb)
    }
}

fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(StewardError::market("symbol must not be empty"));
    }
    Ok(symbol)
}

/// Merge the per-module objects into one map, unwrapping `{raw, fmt}` numbers
fn flatten_modules(result: &Value) -> Snapshot {
    let mut snapshot = Snapshot::new();

    for module in result.as_object().into_iter().flat_map(|m| m.values()) {
        let Some(fields) = module.as_object() else {
            continue;
        };
        for (key, value) in fields {
            // Yahoo sends `{}` for values it does not have
            if value.as_object().is_some_and(|o| o.is_empty()) {
                continue;
            }
            snapshot
                .entry(key.clone())
                .or_insert_with(|| unwrap_raw(value));
        }
    }

    snapshot
}

fn unwrap_raw(value: &Value) -> Value {
    match value {
        Value::Object(map) if map.contains_key("raw") => map["raw"].clone(),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), unwrap_raw(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(unwrap_raw).collect()),
        other => other.clone(),
    }
}
