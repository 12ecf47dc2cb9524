use chrono::{DateTime, Local};
use crate::models::stock::StockRecord;
use crate::logging::LogHandle;

/// `{prefix}_{YYYYmmdd_HHMMSS}.csv`
pub fn default_file_name(prefix: &str, now: DateTime<Local>) -> String {
    format!("{}_{}.csv", prefix, now.format("%Y%m%d_%H%M%S"))
}

// 调试模式下限制处理的股票数量
pub fn limit_symbols(symbols: &mut Vec<String>, max_symbols: usize, log: &LogHandle) {
    if symbols.len() > max_symbols {
        log.info(format_args!(
            "DEBUG MODE: Processing only {} out of {} symbols",
            max_symbols,
            symbols.len()
        ));
        symbols.truncate(max_symbols);
    }
}

/// Plain-text table of records, one row per record, columns padded to the
/// widest value
pub fn render_table(records: &[StockRecord]) -> String {
    let mut widths: Vec<usize> = StockRecord::KEYS.iter().map(|k| k.chars().count()).collect();
    for record in records {
        for (i, (_, value)) in record.fields().iter().enumerate() {
            widths[i] = widths[i].max(value.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(records.len() + 1);
    out.push(line(StockRecord::KEYS.to_vec()));
    for record in records {
        out.push(line(record.fields().iter().map(|(_, v)| *v).collect()));
    }
    out.join("\n")
}

// CSV 数据读写工具
pub mod csv_utils {
    use super::*;
    use crate::errors::{Result, CollectorError};
    use csv::{ReaderBuilder, WriterBuilder};
    use std::fs::{self, File};
    use std::path::{Path, PathBuf};

    /// Write the header row and one row per record
    pub fn save_records_to_csv(records: &[StockRecord], path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        writer.write_record(StockRecord::KEYS)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Save into `output_dir`, creating it if needed. Without a file name one is
    /// derived from the current time. Returns the path written.
    pub fn save_to_dir(
        records: &[StockRecord],
        output_dir: &Path,
        filename: Option<&str>,
        prefix: &str,
        log: &LogHandle,
    ) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)?;

        let filename = match filename {
            Some(name) => name.to_string(),
            None => default_file_name(prefix, Local::now()),
        };
        let path = output_dir.join(filename);

        save_records_to_csv(records, &path)?;
        log.info(format_args!("Saved {} records to {}", records.len(), path.display()));
        Ok(path)
    }

    /// Read a file written by [`save_records_to_csv`]
    pub fn read_records_from_csv(path: &Path) -> Result<Vec<StockRecord>> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

        let headers = reader.headers()?.clone();
        for key in StockRecord::KEYS {
            if !headers.iter().any(|h| h == key) {
                return Err(CollectorError::DataError(format!(
                    "Missing column {} in {}",
                    key,
                    path.display()
                )));
            }
        }

        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: StockRecord = row?;
            records.push(record);
        }
        Ok(records)
    }
}
