use crate::models::stock::StockRecord;
use crate::errors::Result;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Wait applied after each symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pause {
    Fixed(Duration),
    /// Uniformly drawn from `[min, max]`
    Random { min: Duration, max: Duration },
}

impl Pause {
    pub fn sample(&self) -> Duration {
        match *self {
            Pause::Fixed(d) => d,
            Pause::Random { min, max } => {
                if max <= min {
                    return min;
                }
                let secs = rand::thread_rng().gen_range(min.as_secs_f64()..=max.as_secs_f64());
                Duration::from_secs_f64(secs)
            }
        }
    }
}

/// A place stock quotes come from.
///
/// The collector only talks to this trait: fetch raw content, parse it into a
/// record, pause, repeat.
#[async_trait]
pub trait StockSource {
    /// Value written to the `source` column
    fn source_name(&self) -> &'static str;

    /// Prefix of auto-generated output file names
    fn file_prefix(&self) -> &'static str;

    /// Wait between two symbols
    fn pause(&self) -> Pause;

    /// Single request for `symbol`, returning the raw body
    async fn fetch(&self, symbol: &str) -> Result<String>;

    /// Extract a record from a raw body. `None` when the body does not have
    /// the expected structure at all; absent fields become `N/A`.
    fn parse(&self, raw: &str, symbol: &str) -> Option<StockRecord>;

    /// Fetch then parse. Errors from `fetch` are returned so the caller can
    /// log and skip the symbol.
    async fn fetch_record(&self, symbol: &str) -> Result<Option<StockRecord>> {
        let raw = self.fetch(symbol).await?;
        Ok(self.parse(&raw, symbol))
    }
}
