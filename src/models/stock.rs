use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Placeholder for any field the source did not provide
pub const NOT_AVAILABLE: &str = "N/A";

/// Format of `collection_date`
pub const COLLECTION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One normalized quote snapshot for a symbol.
///
/// Field order is the column order of the CSV output. Every field is always
/// set; unresolved values hold [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub change: String,
    pub change_percent: String,
    pub volume: String,
    pub market_cap: String,
    pub pe_ratio: String,
    pub collection_date: String,
    pub source: String,
}

impl StockRecord {
    pub const KEYS: [&'static str; 10] = [
        "symbol",
        "name",
        "price",
        "change",
        "change_percent",
        "volume",
        "market_cap",
        "pe_ratio",
        "collection_date",
        "source",
    ];

    /// Record for `symbol` with every data field unresolved.
    /// The name starts out as the symbol itself.
    pub fn new(symbol: &str, source: &str, collected_at: NaiveDateTime) -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            price: na(),
            change: na(),
            change_percent: na(),
            volume: na(),
            market_cap: na(),
            pe_ratio: na(),
            collection_date: collected_at.format(COLLECTION_DATE_FORMAT).to_string(),
            source: source.to_string(),
        }
    }

    /// `(key, value)` pairs in column order
    pub fn fields(&self) -> [(&'static str, &str); 10] {
        [
            ("symbol", self.symbol.as_str()),
            ("name", self.name.as_str()),
            ("price", self.price.as_str()),
            ("change", self.change.as_str()),
            ("change_percent", self.change_percent.as_str()),
            ("volume", self.volume.as_str()),
            ("market_cap", self.market_cap.as_str()),
            ("pe_ratio", self.pe_ratio.as_str()),
            ("collection_date", self.collection_date.as_str()),
            ("source", self.source.as_str()),
        ]
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "symbol" => Some(&mut self.symbol),
            "name" => Some(&mut self.name),
            "price" => Some(&mut self.price),
            "change" => Some(&mut self.change),
            "change_percent" => Some(&mut self.change_percent),
            "volume" => Some(&mut self.volume),
            "market_cap" => Some(&mut self.market_cap),
            "pe_ratio" => Some(&mut self.pe_ratio),
            "collection_date" => Some(&mut self.collection_date),
            "source" => Some(&mut self.source),
            _ => None,
        }
    }

    /// Fill fields still holding the placeholder with resolved values from `other`.
    /// Fields that already hold a value, the symbol-as-name fallback included,
    /// are kept.
    pub fn merge_missing(&mut self, other: &StockRecord) {
        for (key, value) in other.fields() {
            if value == NOT_AVAILABLE {
                continue;
            }
            if let Some(slot) = self.field_mut(key) {
                if *slot == NOT_AVAILABLE {
                    *slot = value.to_string();
                }
            }
        }
    }

    /// Number of data fields the source actually resolved
    pub fn resolved_count(&self) -> usize {
        self.fields()
            .into_iter()
            .filter(|(_, v)| *v != NOT_AVAILABLE)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_new_record_has_all_keys() {
        let record = StockRecord::new("AAPL", "test", at());
        let keys: Vec<&str> = record.fields().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, StockRecord::KEYS.to_vec());
        assert_eq!(record.name, "AAPL");
        assert_eq!(record.price, NOT_AVAILABLE);
        assert_eq!(record.collection_date, "2024-03-01 09:30:00");
    }

    #[test]
    fn test_get_by_key() {
        let mut record = StockRecord::new("MSFT", "test", at());
        record.price = "410.20".to_string();
        assert_eq!(record.get("price"), Some("410.20"));
        assert_eq!(record.get("market_cap"), Some(NOT_AVAILABLE));
        assert_eq!(record.get("dividend"), None);
    }

    #[test]
    fn test_merge_missing_only_fills_placeholders() {
        let mut quote = StockRecord::new("IBM", "api", at());
        quote.price = "185.00".to_string();

        let mut overview = StockRecord::new("IBM", "api", at());
        overview.name = "International Business Machines".to_string();
        overview.price = "999".to_string();
        overview.market_cap = "170000000000".to_string();

        quote.merge_missing(&overview);

        assert_eq!(quote.price, "185.00");
        assert_eq!(quote.market_cap, "170000000000");
        assert_eq!(quote.pe_ratio, NOT_AVAILABLE);
        assert_eq!(quote.name, "IBM");
        assert_eq!(quote.fields().len(), 10);
    }

    #[test]
    fn test_resolved_count() {
        let mut record = StockRecord::new("V", "test", at());
        // symbol, name, collection_date, source
        assert_eq!(record.resolved_count(), 4);
        record.volume = "1000".to_string();
        assert_eq!(record.resolved_count(), 5);
    }
}
