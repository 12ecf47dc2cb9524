use crate::models::stock::{StockRecord, NOT_AVAILABLE};
use crate::errors::{Result, CollectorError};
use crate::sources::base::{Pause, StockSource};
use crate::config::{Config, API_KEY_ENV};
use crate::logging::LogHandle;
use async_trait::async_trait;
use chrono::Local;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

pub const SOURCE_NAME: &str = "Alpha Vantage API";

/// Query functions used by the collector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFunction {
    GlobalQuote,
    Overview,
}

impl ApiFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiFunction::GlobalQuote => "GLOBAL_QUOTE",
            ApiFunction::Overview => "OVERVIEW",
        }
    }
}

/// Alpha Vantage query endpoint client
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
    delay: Duration,
    include_overview: bool,
    log: LogHandle,
}

impl AlphaVantageClient {
    pub fn new(config: &Config, log: LogHandle) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.api_timeout)
            .build()
            .map_err(CollectorError::RequestError)?;

        let log = log.with_target("alpha_vantage");
        if config.api_key_missing() {
            log.warn(format_args!(
                "API key not provided (set --api-key or {}). Get a free key at https://www.alphavantage.co/support/#api-key",
                API_KEY_ENV
            ));
        }

        Ok(Self {
            client,
            base_url: config.alpha_vantage_base_url.clone(),
            api_key: config.api_key.clone(),
            delay: config.api_delay,
            include_overview: config.include_overview,
            log,
        })
    }

    /// One query call. Non-200 responses and API-level messages are errors.
    pub async fn request(&self, function: ApiFunction, symbol: &str) -> Result<Value> {
        self.log.info(format_args!("Requesting {} for {}...", function.as_str(), symbol));

        let response = match self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", function.as_str()),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.log.error(format_args!("Request for {} failed: {}", symbol, e));
                return Err(CollectorError::RequestError(e));
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            self.log.warn(format_args!("Status code {} for {}", status.as_u16(), symbol));
            return Err(CollectorError::StatusError {
                status: status.as_u16(),
                symbol: symbol.to_string(),
            });
        }

        let json: Value = response.json().await?;
        check_api_message(&json).map_err(|e| {
            self.log.warn(format_args!("{} for {}", e, symbol));
            e
        })?;
        Ok(json)
    }

    /// GLOBAL_QUOTE body into a record. Requires the `Global Quote` object.
    pub fn parse_quote(&self, data: &Value, symbol: &str) -> Option<StockRecord> {
        let quote = match data.get("Global Quote") {
            Some(q) if q.is_object() => q,
            _ => {
                self.log.error(format_args!("Unexpected quote structure for {}", symbol));
                return None;
            }
        };

        let mut record = StockRecord::new(symbol, SOURCE_NAME, Local::now().naive_local());
        record.price = field_or_na(quote, "05. price");
        record.change = field_or_na(quote, "09. change");
        record.change_percent = field_or_na(quote, "10. change percent");
        record.volume = field_or_na(quote, "06. volume");
        Some(record)
    }

    /// OVERVIEW body into a record. Requires the top-level `Symbol` key.
    pub fn parse_overview(&self, data: &Value, symbol: &str) -> Option<StockRecord> {
        if data.get("Symbol").is_none() {
            self.log.error(format_args!("Unexpected overview structure for {}", symbol));
            return None;
        }

        let mut record = StockRecord::new(symbol, SOURCE_NAME, Local::now().naive_local());
        if let Some(name) = field(data, "Name") {
            record.name = name;
        }
        record.market_cap = field_or_na(data, "MarketCapitalization");
        record.pe_ratio = field_or_na(data, "PERatio");
        Some(record)
    }

    pub async fn get_stock_quote(&self, symbol: &str) -> Result<Option<StockRecord>> {
        let data = self.request(ApiFunction::GlobalQuote, symbol).await?;
        Ok(self.parse_quote(&data, symbol))
    }

    pub async fn get_company_overview(&self, symbol: &str) -> Result<Option<StockRecord>> {
        let data = self.request(ApiFunction::Overview, symbol).await?;
        Ok(self.parse_overview(&data, symbol))
    }
}

/// Alpha Vantage reports most failures as a 200 with a message key
fn check_api_message(data: &Value) -> Result<()> {
    for key in ["Error Message", "Information", "Note"] {
        if let Some(message) = data.get(key) {
            let text = message.as_str().map(str::to_string).unwrap_or_else(|| message.to_string());
            return Err(CollectorError::ApiError(format!("{}: {}", key, text)));
        }
    }
    Ok(())
}

/// Scalar value rendered as text; null, empty and nested values count as absent
fn field(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn field_or_na(data: &Value, key: &str) -> String {
    field(data, key).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[async_trait]
impl StockSource for AlphaVantageClient {
    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn file_prefix(&self) -> &'static str {
        "stocks_api_data"
    }

    fn pause(&self) -> Pause {
        Pause::Fixed(self.delay)
    }

    async fn fetch(&self, symbol: &str) -> Result<String> {
        let data = self.request(ApiFunction::GlobalQuote, symbol).await?;
        Ok(data.to_string())
    }

    fn parse(&self, raw: &str, symbol: &str) -> Option<StockRecord> {
        match serde_json::from_str::<Value>(raw) {
            Ok(data) => self.parse_quote(&data, symbol),
            Err(e) => {
                self.log.error(format_args!("Invalid JSON for {}: {}", symbol, e));
                None
            }
        }
    }

    /// Quote first, then the company overview to fill what the quote lacks.
    /// A failed overview keeps the quote-only record.
    async fn fetch_record(&self, symbol: &str) -> Result<Option<StockRecord>> {
        let mut record = match self.get_stock_quote(symbol).await? {
            Some(record) => record,
            None => return Ok(None),
        };

        if !self.include_overview {
            return Ok(Some(record));
        }

        match self.get_company_overview(symbol).await {
            Ok(Some(overview)) => record.merge_missing(&overview),
            Ok(None) => {}
            Err(e) => self.log.warn(format_args!("Overview unavailable for {}: {}", symbol, e)),
        }
        Ok(Some(record))
    }
}
