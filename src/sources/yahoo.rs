use crate::models::stock::{StockRecord, NOT_AVAILABLE};
use crate::errors::{Result, CollectorError};
use crate::sources::base::{Pause, StockSource};
use crate::config::Config;
use crate::logging::LogHandle;
use async_trait::async_trait;
use chrono::Local;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, USER_AGENT};
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};

pub const SOURCE_NAME: &str = "Yahoo Finance (Web Scraping)";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const NAME_SELECTOR: &str = r#"h1[class="D(ib) Fz(18px)"]"#;
const MARKET_CAP_SELECTOR: &str = r#"td[data-test="MARKET_CAP-value"]"#;
const PE_RATIO_SELECTOR: &str = r#"td[data-test="PE_RATIO-value"]"#;

/// Quote page scraper
pub struct YahooScraper {
    client: Client,
    base_url: String,
    pause: Pause,
    log: LogHandle,
}

impl YahooScraper {
    pub fn new(config: &Config, log: LogHandle) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));

        let client = Client::builder()
            .timeout(config.page_timeout)
            .default_headers(headers)
            .build()
            .map_err(CollectorError::RequestError)?;

        Ok(Self {
            client,
            base_url: config.yahoo_base_url.clone(),
            pause: Pause::Random {
                min: config.scrape_delay_min,
                max: config.scrape_delay_max,
            },
            log: log.with_target("yahoo"),
        })
    }

    fn quote_url(&self, symbol: &str) -> String {
        format!("{}{}", self.base_url, symbol)
    }
}

/// Escape a value for use inside a double-quoted attribute selector
fn css_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn streamer_selector(field: &str, symbol: &str) -> String {
    format!(
        r#"fin-streamer[data-field="{}"][data-symbol="{}"]"#,
        field,
        css_string(symbol)
    )
}

fn find_first<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn text_or_na(element: Option<ElementRef<'_>>) -> String {
    element
        .map(element_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Company name from the page header, which reads like `Apple Inc. (AAPL)`
fn header_name(element: ElementRef<'_>) -> Option<String> {
    let text = element_text(element);
    let name = text.split('(').next().unwrap_or_default().trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[async_trait]
impl StockSource for YahooScraper {
    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    fn file_prefix(&self) -> &'static str {
        "stocks_data"
    }

    fn pause(&self) -> Pause {
        self.pause
    }

    async fn fetch(&self, symbol: &str) -> Result<String> {
        let url = self.quote_url(symbol);
        self.log.info(format_args!("Fetching data for {}...", symbol));

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                self.log.error(format_args!("Error fetching data for {}: {}", symbol, e));
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

        let html = response.text().await?;
        self.log.debug(format_args!("Received {} bytes for {}", html.len(), symbol));
        Ok(html)
    }

    fn parse(&self, raw: &str, symbol: &str) -> Option<StockRecord> {
        let document = Html::parse_document(raw);

        let name_el = find_first(&document, NAME_SELECTOR);
        let price_el = find_first(&document, &streamer_selector("regularMarketPrice", symbol));
        let change_el = find_first(&document, &streamer_selector("regularMarketChange", symbol));
        let change_pct_el = find_first(&document, &streamer_selector("regularMarketChangePercent", symbol));
        let volume_el = find_first(&document, &streamer_selector("regularMarketVolume", symbol));
        let market_cap_el = find_first(&document, MARKET_CAP_SELECTOR);
        let pe_ratio_el = find_first(&document, PE_RATIO_SELECTOR);

        let markers = [
            name_el,
            price_el,
            change_el,
            change_pct_el,
            volume_el,
            market_cap_el,
            pe_ratio_el,
        ];
        if markers.iter().all(Option::is_none) {
            self.log.error(format_args!("No quote data found on page for {}", symbol));
            return None;
        }

        let mut record = StockRecord::new(symbol, SOURCE_NAME, Local::now().naive_local());
        if let Some(name) = name_el.and_then(header_name) {
            record.name = name;
        }
        record.price = text_or_na(price_el);
        record.change = text_or_na(change_el);
        record.change_percent = text_or_na(change_pct_el);
        record.volume = text_or_na(volume_el);
        record.market_cap = text_or_na(market_cap_el);
        record.pe_ratio = text_or_na(pe_ratio_el);

        self.log.debug(format_args!(
            "Parsed {} with {} resolved fields",
            symbol,
            record.resolved_count()
        ));
        Some(record)
    }
}
