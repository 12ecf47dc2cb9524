use chrono::Local;
use env_logger::{Builder, Env};
use log::{Level, Log, Metadata, Record};
use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Logger handle passed explicitly to every component.
///
/// Wraps any `log::Log` backend. Nothing here installs a process-wide logger,
/// so two collectors in one process can log to different sinks.
#[derive(Clone)]
pub struct LogHandle {
    inner: Arc<dyn Log + Send + Sync>,
    target: String,
}

impl LogHandle {
    pub fn new(inner: Arc<dyn Log + Send + Sync>, target: &str) -> Self {
        Self {
            inner,
            target: target.to_string(),
        }
    }

    /// env_logger backend filtered by `RUST_LOG` (default `info`), with
    /// `timestamp - target - LEVEL - message` lines on stderr
    pub fn from_env(target: &str) -> Self {
        let logger = Builder::from_env(Env::default().default_filter_or("info"))
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} - {} - {} - {}",
                    Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                    record.target(),
                    record.level(),
                    record.args()
                )
            })
            .build();
        Self::new(Arc::new(logger), target)
    }

    /// Handle that drops everything
    pub fn silent() -> Self {
        Self::new(Arc::new(NullLog), "silent")
    }

    /// Same backend, different target
    pub fn with_target(&self, target: &str) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            target: target.to_string(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let metadata = Metadata::builder().level(level).target(&self.target).build();
        if !self.inner.enabled(&metadata) {
            return;
        }
        self.inner.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .build(),
        );
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    pub fn flush(&self) {
        self.inner.flush();
    }
}

impl fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogHandle").field("target", &self.target).finish()
    }
}

struct NullLog;

impl Log for NullLog {
    fn enabled(&self, _: &Metadata) -> bool {
        false
    }

    fn log(&self, _: &Record) {}

    fn flush(&self) {}
}

/// In-memory backend that keeps `LEVEL target: message` lines
#[derive(Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

impl Log for MemoryLog {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(format!("{} {}: {}", record.level(), record.target(), record.args()));
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_routes_to_its_backend() {
        let memory = MemoryLog::new();
        let log = LogHandle::new(memory.clone(), "collector");

        log.info(format_args!("Fetching {}", "AAPL"));
        log.with_target("yahoo").warn(format_args!("Status code {}", 404));

        assert_eq!(
            memory.lines(),
            vec![
                "INFO collector: Fetching AAPL".to_string(),
                "WARN yahoo: Status code 404".to_string(),
            ]
        );
    }

    #[test]
    fn test_separate_handles_do_not_share_output() {
        let first = MemoryLog::new();
        let second = MemoryLog::new();
        LogHandle::new(first.clone(), "a").error(format_args!("boom"));
        LogHandle::new(second.clone(), "b").info(format_args!("fine"));

        assert!(first.contains("boom"));
        assert!(!first.contains("fine"));
        assert!(second.contains("fine"));
    }

    #[test]
    fn test_silent_handle() {
        let log = LogHandle::silent();
        log.error(format_args!("dropped"));
        assert_eq!(log.target(), "silent");
    }
}
