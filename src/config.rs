use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SYMBOLS: [&str; 10] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "META", "TSLA", "NVDA", "JPM", "JNJ", "V",
];

/// Value shipped in place of a real Alpha Vantage key
pub const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY";

pub const API_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";

pub struct Config {
    pub debug_mode: bool,
    pub debug_symbol_limit: usize,
    pub output_dir: PathBuf,

    pub yahoo_base_url: String,
    pub page_timeout: Duration,
    pub scrape_delay_min: Duration,
    pub scrape_delay_max: Duration,

    pub alpha_vantage_base_url: String,
    pub api_key: String,
    pub api_timeout: Duration,
    /// Free tier allows 5 calls per minute
    pub api_delay: Duration,
    pub include_overview: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            debug_mode: false,
            debug_symbol_limit: 2,
            output_dir: PathBuf::from("data"),
            yahoo_base_url: "https://finance.yahoo.com/quote/".to_string(),
            page_timeout: Duration::from_secs(10),
            scrape_delay_min: Duration::from_secs(1),
            scrape_delay_max: Duration::from_secs(3),
            alpha_vantage_base_url: "https://www.alphavantage.co/query".to_string(),
            api_key: API_KEY_PLACEHOLDER.to_string(),
            api_timeout: Duration::from_secs(30),
            api_delay: Duration::from_secs(12),
            include_overview: true,
        }
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn with_debug_symbol_limit(mut self, limit: usize) -> Self {
        self.debug_symbol_limit = limit;
        self
    }

    pub fn with_output_dir(mut self, dir: &str) -> Self {
        self.output_dir = PathBuf::from(dir);
        self
    }

    pub fn with_yahoo_base_url(mut self, url: &str) -> Self {
        self.yahoo_base_url = url.to_string();
        self
    }

    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    pub fn with_scrape_delay(mut self, min: Duration, max: Duration) -> Self {
        self.scrape_delay_min = min;
        self.scrape_delay_max = max;
        self
    }

    pub fn with_alpha_vantage_base_url(mut self, url: &str) -> Self {
        self.alpha_vantage_base_url = url.to_string();
        self
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = key.to_string();
        self
    }

    pub fn with_api_timeout(mut self, timeout: Duration) -> Self {
        self.api_timeout = timeout;
        self
    }

    pub fn with_api_delay(mut self, delay: Duration) -> Self {
        self.api_delay = delay;
        self
    }

    pub fn with_include_overview(mut self, include: bool) -> Self {
        self.include_overview = include;
        self
    }

    /// True when no usable API key was configured
    pub fn api_key_missing(&self) -> bool {
        let key = self.api_key.trim();
        key.is_empty() || key == API_KEY_PLACEHOLDER
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a comma separated symbol list, dropping blanks and upper-casing
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn default_symbols() -> Vec<String> {
    DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.output_dir, PathBuf::from("data"));
        assert_eq!(config.page_timeout, Duration::from_secs(10));
        assert_eq!(config.api_timeout, Duration::from_secs(30));
        assert_eq!(config.api_delay, Duration::from_secs(12));
        assert!(config.include_overview);
        assert!(config.api_key_missing());
    }

    #[test]
    fn test_api_key_missing() {
        assert!(Config::new().with_api_key("  ").api_key_missing());
        assert!(!Config::new().with_api_key("demo").api_key_missing());
    }

    #[test]
    fn test_parse_symbols() {
        assert_eq!(parse_symbols("aapl, MSFT,,brk.b "), vec!["AAPL", "MSFT", "BRK.B"]);
        assert!(parse_symbols(" , ").is_empty());
        assert_eq!(default_symbols().len(), 10);
    }
}
