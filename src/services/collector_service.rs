use crate::models::stock::StockRecord;
use crate::sources::base::StockSource;
use crate::errors::Result;
use crate::config::Config;
use crate::logging::LogHandle;
use crate::util::{self, csv_utils};
use std::path::PathBuf;
use std::sync::Arc;

/// Drives one source over a symbol list and saves the results
pub struct CollectorService {
    config: Config,
    source: Arc<dyn StockSource + Send + Sync>,
    log: LogHandle,
}

impl CollectorService {
    pub fn new(config: Config, source: Arc<dyn StockSource + Send + Sync>, log: LogHandle) -> Self {
        Self {
            config,
            source,
            log: log.with_target("collector"),
        }
    }

    /// Collect a record per symbol, in input order.
    ///
    /// Symbols whose fetch or parse fails are left out. The source's pause is
    /// applied after every symbol, skipped ones included.
    pub async fn collect(&self, symbols: &[String]) -> Vec<StockRecord> {
        let mut symbols = symbols.to_vec();
        if self.config.debug_mode {
            util::limit_symbols(&mut symbols, self.config.debug_symbol_limit, &self.log);
        }

        self.log.info(format_args!(
            "Collecting {} symbols from {}",
            symbols.len(),
            self.source.source_name()
        ));

        let mut records = Vec::with_capacity(symbols.len());
        for symbol in &symbols {
            match self.source.fetch_record(symbol).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {
                    self.log.warn(format_args!("Skipping {}: unexpected data structure", symbol));
                }
                Err(e) => {
                    self.log.warn(format_args!("Skipping {}: {}", symbol, e));
                }
            }

            let wait = self.source.pause().sample();
            self.log.debug(format_args!("Waiting {:?} before next request", wait));
            tokio::time::sleep(wait).await;
        }

        self.log.info(format_args!(
            "Collected {} of {} symbols",
            records.len(),
            symbols.len()
        ));
        records
    }

    /// Save records under the configured output directory
    pub fn save(&self, records: &[StockRecord], filename: Option<&str>) -> Result<PathBuf> {
        csv_utils::save_to_dir(
            records,
            &self.config.output_dir,
            filename,
            self.source.file_prefix(),
            &self.log,
        )
    }

    /// Collect, then save when anything was collected.
    /// `Ok(None)` means no data was collected and nothing was written.
    pub async fn run(&self, symbols: &[String], filename: Option<&str>) -> Result<Option<(PathBuf, Vec<StockRecord>)>> {
        let records = self.collect(symbols).await;
        if records.is_empty() {
            self.log.warn(format_args!("No data collected"));
            return Ok(None);
        }

        let path = self.save(&records, filename)?;
        Ok(Some((path, records)))
    }
}
